use std::sync::Arc;

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use common_auth::{TokenSigner, TokenVerifier};
use sqlx::PgPool;
use tracing::error;

use crate::config::AppConfig;
use crate::metrics::AccountMetrics;
use crate::{account_handlers, auth_handlers, management_handlers, tool_handlers};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub token_signer: Arc<TokenSigner>,
    pub token_verifier: Arc<TokenVerifier>,
    pub config: Arc<AppConfig>,
    pub metrics: Arc<AccountMetrics>,
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.token_verifier.clone()
    }
}

impl FromRef<AppState> for Arc<TokenSigner> {
    fn from_ref(state: &AppState) -> Self {
        state.token_signer.clone()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(?err, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Full route table. Middleware (CORS) is layered on by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/account", get(account_handlers::get_account))
        .route("/api/account/upgrade", post(account_handlers::submit_upgrade))
        .route(
            "/api/account/upgradeHistory",
            get(account_handlers::upgrade_history),
        )
        .route(
            "/api/account/favourite",
            get(account_handlers::list_favourites),
        )
        .route(
            "/api/account/favourite/add",
            post(account_handlers::add_favourite),
        )
        .route(
            "/api/account/favourite/remove",
            post(account_handlers::remove_favourite),
        )
        .route(
            "/api/management/requests",
            get(management_handlers::list_requests),
        )
        .route(
            "/api/management/requests/approve",
            post(management_handlers::approve_request),
        )
        .route(
            "/api/management/requests/reject",
            post(management_handlers::reject_request),
        )
        .route("/api/management/tools", get(management_handlers::list_tools))
        .route(
            "/api/management/tool/disable",
            post(management_handlers::disable_tool),
        )
        .route(
            "/api/management/tool/active",
            post(management_handlers::enable_tool),
        )
        .route(
            "/api/management/tool/update",
            post(management_handlers::update_tool_access),
        )
        .route("/api/tool/categories", get(tool_handlers::list_categories))
        .route(
            "/api/tool/categories/:category_id",
            get(tool_handlers::list_tools_in_category),
        )
        .with_state(state)
}
