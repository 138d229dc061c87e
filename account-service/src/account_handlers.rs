use axum::{extract::State, Json};
use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResponse, ApiResult};
use serde::Deserialize;
use uuid::Uuid;

use crate::authz::require_authenticated;
use crate::models::{Tool, User};
use crate::upgrade::{self, UpgradeRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteRequest {
    pub tool_id: Uuid,
}

/// The caller's own identity fields; never the password hash.
pub async fn get_account(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = require_authenticated(&state.db, auth.subject()).await?;
    Ok(ApiResponse::ok(user, "Account fetched successfully"))
}

pub async fn submit_upgrade(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<UpgradeRequest>>> {
    let user = require_authenticated(&state.db, auth.subject()).await?;
    let request = upgrade::submit(&state.db, &user).await.map_err(ApiError::from)?;
    Ok(ApiResponse::ok(
        request,
        "Upgrade request submitted. Awaiting review.",
    ))
}

pub async fn upgrade_history(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<Vec<UpgradeRequest>>>> {
    let user = require_authenticated(&state.db, auth.subject()).await?;
    let requests = upgrade::history(&state.db, user.id)
        .await
        .map_err(ApiError::from)?;
    Ok(ApiResponse::ok(
        requests,
        "Upgrade history fetched successfully",
    ))
}

pub async fn list_favourites(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<Vec<Tool>>>> {
    let user = require_authenticated(&state.db, auth.subject()).await?;

    let tools = sqlx::query_as::<_, Tool>(
        "SELECT t.id, t.name, t.description, t.status, t.access_tier, t.icon_url,
                t.category_id, t.is_deleted
         FROM favourite_tools f
         JOIN tools t ON t.id = f.tool_id
         WHERE f.user_id = $1 AND t.is_deleted = FALSE
         ORDER BY t.name",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(ApiResponse::ok(tools, "Favourite tools fetched successfully"))
}

pub async fn add_favourite(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<FavouriteRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let user = require_authenticated(&state.db, auth.subject()).await?;

    sqlx::query("INSERT INTO favourite_tools (user_id, tool_id) VALUES ($1, $2)")
        .bind(user.id)
        .bind(payload.tool_id)
        .execute(&state.db)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => ApiError::Conflict {
                code: "favourite_exists",
                message: "Tool is already in favourites",
            },
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                ApiError::NotFound {
                    code: "tool_not_found",
                    message: "Tool not found",
                }
            }
            _ => ApiError::internal(err),
        })?;

    Ok(ApiResponse::message("Tool added to favourites"))
}

/// Removing an absent favourite is a no-op, not an error.
pub async fn remove_favourite(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<FavouriteRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let user = require_authenticated(&state.db, auth.subject()).await?;

    sqlx::query("DELETE FROM favourite_tools WHERE user_id = $1 AND tool_id = $2")
        .bind(user.id)
        .bind(payload.tool_id)
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    Ok(ApiResponse::message("Tool removed from favourites"))
}
