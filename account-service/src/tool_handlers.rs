use axum::extract::{Path, State};
use axum::Json;
use common_http_errors::{ApiError, ApiResponse, ApiResult};
use uuid::Uuid;

use crate::models::{Tool, ToolCategory};
use crate::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<ToolCategory>>>> {
    let categories =
        sqlx::query_as::<_, ToolCategory>("SELECT id, name FROM tool_categories ORDER BY name")
            .fetch_all(&state.db)
            .await
            .map_err(ApiError::internal)?;

    Ok(ApiResponse::ok(
        categories,
        "Tool categories fetched successfully",
    ))
}

/// Tools in one category; the literal `0` lists every non-deleted tool.
pub async fn list_tools_in_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Tool>>>> {
    if category_id == "0" {
        let tools = sqlx::query_as::<_, Tool>(
            "SELECT id, name, description, status, access_tier, icon_url, category_id, is_deleted
             FROM tools WHERE is_deleted = FALSE ORDER BY name",
        )
        .fetch_all(&state.db)
        .await
        .map_err(ApiError::internal)?;
        return Ok(ApiResponse::ok(tools, "Tools fetched successfully"));
    }

    let category_id = Uuid::parse_str(&category_id)
        .map_err(|_| ApiError::validation("invalid_category", "Invalid category id"))?;

    let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM tool_categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::internal)?;

    if exists.is_none() {
        return Err(ApiError::NotFound {
            code: "category_not_found",
            message: "Tool category not found",
        });
    }

    let tools = sqlx::query_as::<_, Tool>(
        "SELECT id, name, description, status, access_tier, icon_url, category_id, is_deleted
         FROM tools WHERE category_id = $1 AND is_deleted = FALSE ORDER BY name",
    )
    .bind(category_id)
    .fetch_all(&state.db)
    .await
    .map_err(ApiError::internal)?;

    Ok(ApiResponse::ok(tools, "Tools fetched successfully"))
}
