use common_http_errors::ApiError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Role, User};

/// Loads the caller's identity record. Any valid identity suffices; used
/// for self-service operations.
pub async fn require_authenticated(db: &PgPool, user_id: Uuid) -> Result<User, ApiError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, role, tier, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .map_err(ApiError::internal)?;

    user.ok_or(ApiError::NotFound {
        code: "user_not_found",
        message: "User not found",
    })
}

/// Loads the caller's identity record and enforces the required role.
/// The role is read fresh from the store on every call, so a role change
/// takes effect on the next request, not the next login.
pub async fn require_role(db: &PgPool, user_id: Uuid, role: Role) -> Result<User, ApiError> {
    let user = require_authenticated(db, user_id).await?;
    if user.role != role {
        return Err(ApiError::Forbidden);
    }
    Ok(user)
}
