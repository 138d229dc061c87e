use std::{env, path::PathBuf, sync::Arc, time::Duration};

use account_service::config::AppConfig;
use account_service::metrics::AccountMetrics;
use account_service::models::{Role, Tier};
use account_service::password;
use account_service::AppState;
use anyhow::{anyhow, Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Router;
use common_auth::{TokenConfig, TokenSigner, TokenVerifier};
use dirs::cache_dir;
use pg_embed::pg_enums::PgAuthMethod;
use pg_embed::pg_fetch::{PgFetchSettings, PG_V13};
use pg_embed::postgres::{PgEmbed, PgSettings};
use portpicker::pick_unused_port;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tempfile::{tempdir, TempDir};
use tower::util::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
pub const TEST_JWT_SECRET: &str = "account-service-test-secret";
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "CorrectHorseBatteryStaple1!";

pub struct TestDatabase {
    pool: PgPool,
    embedded: Option<EmbeddedPg>,
}

impl TestDatabase {
    pub async fn setup() -> Result<Option<Self>> {
        if env::var("ACCOUNT_TEST_DATABASE_URL").is_err()
            && !env_flag_enabled("ACCOUNT_TEST_USE_EMBED")
        {
            eprintln!(
                "Skipping account-service integration tests: set ACCOUNT_TEST_DATABASE_URL or ACCOUNT_TEST_USE_EMBED=1 to run them.",
            );
            return Ok(None);
        }

        let mut embedded = None;
        let database_url = if let Ok(url) = env::var("ACCOUNT_TEST_DATABASE_URL") {
            url
        } else {
            if env_flag_enabled("ACCOUNT_TEST_EMBED_CLEAR_CACHE") {
                if let Some(cache_dir) = cache_dir() {
                    let _ = std::fs::remove_dir_all(cache_dir.join("pg-embed"));
                }
            }

            let temp = tempdir()?;
            let port = pick_unused_port()
                .context("failed to find available port for embedded Postgres")?;

            let mut fetch_settings = PgFetchSettings::default();
            fetch_settings.version = PG_V13;

            let mut pg = PgEmbed::new(
                PgSettings {
                    database_dir: temp.path().to_path_buf(),
                    port,
                    user: "postgres".to_string(),
                    password: "postgres".to_string(),
                    auth_method: PgAuthMethod::Plain,
                    persistent: false,
                    timeout: Some(Duration::from_secs(30)),
                    migration_dir: None,
                },
                fetch_settings,
            )
            .await?;

            pg.setup().await?;
            pg.start_db().await?;

            let uri = format!("{}/postgres", pg.db_uri);
            embedded = Some(EmbeddedPg {
                pg,
                _temp_dir: temp,
            });
            uri
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        if embedded.is_some() || env_flag_enabled("ACCOUNT_TEST_APPLY_MIGRATIONS") {
            run_migrations(&pool).await?;
        }

        Ok(Some(Self { pool, embedded }))
    }

    pub fn pool_clone(&self) -> PgPool {
        self.pool.clone()
    }

    pub async fn teardown(self) -> Result<()> {
        if let Some(embedded) = self.embedded {
            embedded.shutdown().await;
        }
        Ok(())
    }
}

struct EmbeddedPg {
    pg: PgEmbed,
    _temp_dir: TempDir,
}

impl EmbeddedPg {
    async fn shutdown(mut self) {
        let _ = self.pg.stop_db().await;
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let migrations_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let mut entries = std::fs::read_dir(&migrations_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        let sql = std::fs::read_to_string(&path)?;
        for statement in sql.split(';') {
            let trimmed = statement.trim();
            if trimmed.is_empty() {
                continue;
            }
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

/// Application state wired exactly as the binary does, against the test
/// secret and pool.
#[allow(dead_code)]
pub fn build_state(pool: PgPool) -> Result<AppState> {
    let token_config = TokenConfig::new(TEST_JWT_SECRET).with_ttl(3600);

    Ok(AppState {
        db: pool,
        token_signer: Arc::new(TokenSigner::new(&token_config)),
        token_verifier: Arc::new(TokenVerifier::new(&token_config)),
        config: Arc::new(AppConfig {
            database_url: String::new(),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            token_ttl_seconds: 3600,
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: Vec::new(),
        }),
        metrics: Arc::new(AccountMetrics::new()?),
    })
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct SeededUser {
    pub user_id: Uuid,
    pub username: String,
    pub password: String,
}

#[allow(dead_code)]
pub async fn seed_user(pool: &PgPool, role: Role, tier: Tier) -> Result<SeededUser> {
    let user_id = Uuid::new_v4();
    let username = format!("user-{}@example.com", user_id.simple());
    let password_hash =
        password::hash_password(TEST_PASSWORD).map_err(|err| anyhow!("hash failed: {err}"))?;

    sqlx::query(
        "INSERT INTO users (id, username, password_hash, role, tier) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(&username)
    .bind(&password_hash)
    .bind(role)
    .bind(tier)
    .execute(pool)
    .await?;

    Ok(SeededUser {
        user_id,
        username,
        password: TEST_PASSWORD.to_string(),
    })
}

/// Drives one request through the router and decodes the JSON body.
#[allow(dead_code)]
pub async fn send_json(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|err| anyhow!("router error: {err:?}"))?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}

fn env_flag_enabled(key: &str) -> bool {
    matches!(env::var(key), Ok(value) if is_truthy(value.as_str()))
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}
