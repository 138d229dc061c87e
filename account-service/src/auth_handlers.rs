use axum::{extract::State, Json};
use common_http_errors::{ApiError, ApiResponse, ApiResult};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{Role, Tier, User};
use crate::password;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Username must be a valid email address"))]
    pub username: String,
    #[validate(custom(
        function = "validate_password_strength",
        message = "Password must be at least 8 characters with upper and lower case letters, a digit and a symbol"
    ))]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub tier: Option<Tier>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Username must be a valid email address"))]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPayload {
    pub token: String,
}

#[derive(FromRow)]
struct CredentialRow {
    id: Uuid,
    password_hash: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    payload
        .validate()
        .map_err(|errs| ApiError::validation("invalid_input", validation_message(&errs)))?;

    let password_hash = password::hash_password(&payload.password).map_err(ApiError::internal)?;
    let role = payload.role.unwrap_or(Role::User);
    let tier = payload.tier.unwrap_or(Tier::Membership);

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, username, password_hash, role, tier)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, username, role, tier, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&payload.username)
    .bind(&password_hash)
    .bind(role)
    .bind(tier)
    .fetch_one(&state.db)
    .await
    .map_err(|err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => ApiError::Conflict {
            code: "username_taken",
            message: "Username already exists",
        },
        _ => ApiError::internal(err),
    })?;

    Ok(ApiResponse::ok(user, "User registered successfully"))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<TokenPayload>>> {
    payload
        .validate()
        .map_err(|errs| ApiError::validation("invalid_input", validation_message(&errs)))?;

    let row = sqlx::query_as::<_, CredentialRow>(
        "SELECT id, password_hash FROM users WHERE username = $1",
    )
    .bind(&payload.username)
    .fetch_optional(&state.db)
    .await
    .map_err(ApiError::internal)?;

    let Some(row) = row else {
        state.metrics.login_attempt("failure");
        warn!(username = %payload.username, "login attempt for unknown username");
        return Err(invalid_credentials());
    };

    if !password::verify_password(&payload.password, &row.password_hash) {
        state.metrics.login_attempt("failure");
        warn!(user_id = %row.id, "login attempt with wrong password");
        return Err(invalid_credentials());
    }

    let issued = state.token_signer.issue(row.id).map_err(ApiError::from)?;
    state.metrics.login_attempt("success");

    Ok(ApiResponse::ok(
        TokenPayload {
            token: issued.token,
        },
        "Login successful",
    ))
}

/// One fixed message for both unknown-username and wrong-password, so a
/// caller cannot probe which usernames exist.
fn invalid_credentials() -> ApiError {
    ApiError::validation("invalid_credentials", "Invalid username or password")
}

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    if long_enough && has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::new("password_policy"))
    }
}

fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .find_map(|err| err.message.as_ref().map(|msg| msg.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}
