use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use account_service::app::router;
use account_service::config::load_app_config;
use account_service::metrics::AccountMetrics;
use account_service::AppState;
use common_auth::{TokenConfig, TokenSigner, TokenVerifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Fails fast when the signing secret is absent; the process must not
    // come up able to serve requests it cannot authenticate.
    let config = load_app_config()?;

    let token_config =
        TokenConfig::new(config.jwt_secret.clone()).with_ttl(config.token_ttl_seconds);
    let token_signer = Arc::new(TokenSigner::new(&token_config));
    let token_verifier = Arc::new(TokenVerifier::new(&token_config));

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;

    let ip: std::net::IpAddr = config.host.parse().context("Failed to parse HOST")?;
    let addr = SocketAddr::from((ip, config.port));

    let origins = config
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION]);

    let state = AppState {
        db,
        token_signer,
        token_verifier,
        config: Arc::new(config),
        metrics: Arc::new(AccountMetrics::new()?),
    };

    let app = router(state).layer(cors);

    info!(%addr, "starting account-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
