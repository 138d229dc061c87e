use axum::{extract::State, Json};
use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResponse, ApiResult};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::authz::require_role;
use crate::models::{Role, Tier, Tool, ToolStatus};
use crate::upgrade::{self, PendingRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDecision {
    pub request_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRef {
    pub tool_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAccessUpdate {
    pub tool_id: Uuid,
    pub access_tier: Tier,
}

pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<Vec<PendingRequest>>>> {
    require_role(&state.db, auth.subject(), Role::Admin).await?;

    let requests = upgrade::list_pending(&state.db)
        .await
        .map_err(ApiError::from)?;
    Ok(ApiResponse::ok(
        requests,
        "Pending upgrade requests fetched successfully",
    ))
}

pub async fn approve_request(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<RequestDecision>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let admin = require_role(&state.db, auth.subject(), Role::Admin).await?;

    let user_id = upgrade::approve(&state.db, payload.request_id)
        .await
        .map_err(ApiError::from)?;
    state.metrics.upgrade_decision("approved");
    info!(
        admin_id = %admin.id,
        request_id = %payload.request_id,
        %user_id,
        "upgrade request approved"
    );

    Ok(ApiResponse::message("Upgrade request approved"))
}

pub async fn reject_request(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<RequestDecision>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let admin = require_role(&state.db, auth.subject(), Role::Admin).await?;

    upgrade::reject(&state.db, payload.request_id)
        .await
        .map_err(ApiError::from)?;
    state.metrics.upgrade_decision("rejected");
    info!(
        admin_id = %admin.id,
        request_id = %payload.request_id,
        "upgrade request rejected"
    );

    Ok(ApiResponse::message("Upgrade request rejected"))
}

/// Every tool, including disabled and soft-deleted ones.
pub async fn list_tools(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<ApiResponse<Vec<Tool>>>> {
    require_role(&state.db, auth.subject(), Role::Admin).await?;

    let tools = sqlx::query_as::<_, Tool>(
        "SELECT id, name, description, status, access_tier, icon_url, category_id, is_deleted
         FROM tools
         ORDER BY name",
    )
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(ApiResponse::ok(tools, "Tools fetched successfully"))
}

pub async fn disable_tool(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<ToolRef>,
) -> ApiResult<Json<ApiResponse<()>>> {
    set_tool_status(&state, auth, payload.tool_id, ToolStatus::Disabled).await?;
    Ok(ApiResponse::message("Tool disabled successfully"))
}

pub async fn enable_tool(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<ToolRef>,
) -> ApiResult<Json<ApiResponse<()>>> {
    set_tool_status(&state, auth, payload.tool_id, ToolStatus::Active).await?;
    Ok(ApiResponse::message("Tool activated successfully"))
}

async fn set_tool_status(
    state: &AppState,
    auth: AuthContext,
    tool_id: Uuid,
    status: ToolStatus,
) -> Result<(), ApiError> {
    require_role(&state.db, auth.subject(), Role::Admin).await?;

    let result = sqlx::query("UPDATE tools SET status = $2 WHERE id = $1 AND is_deleted = FALSE")
        .bind(tool_id)
        .bind(status)
        .execute(&state.db)
        .await
        .map_err(ApiError::internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            code: "tool_not_found",
            message: "Tool not found",
        });
    }
    Ok(())
}

pub async fn update_tool_access(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(payload): Json<ToolAccessUpdate>,
) -> ApiResult<Json<ApiResponse<()>>> {
    require_role(&state.db, auth.subject(), Role::Admin).await?;

    let result =
        sqlx::query("UPDATE tools SET access_tier = $2 WHERE id = $1 AND is_deleted = FALSE")
            .bind(payload.tool_id)
            .bind(payload.access_tier)
            .execute(&state.db)
            .await
            .map_err(ApiError::internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            code: "tool_not_found",
            message: "Tool not found",
        });
    }

    Ok(ApiResponse::message("Tool access level updated successfully"))
}
