use anyhow::{bail, Context, Result};
use std::env;

/// Process-wide configuration, loaded once at startup. Lifecycle is
/// process start to shutdown; no runtime mutation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Token signing secret. Absence is a startup failure, never a
    /// per-request error.
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

pub fn load_app_config() -> Result<AppConfig> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let jwt_secret = env::var("APP_JWT_SECRET").context("APP_JWT_SECRET must be set")?;
    if jwt_secret.trim().is_empty() {
        bail!("APP_JWT_SECRET must not be empty");
    }

    let token_ttl_seconds = env::var("APP_TOKEN_TTL_SECONDS")
        .ok()
        .map(|value| value.parse::<i64>())
        .transpose()
        .context("Failed to parse APP_TOKEN_TTL_SECONDS")?
        .unwrap_or(3600);
    if token_ttl_seconds <= 0 {
        bail!("APP_TOKEN_TTL_SECONDS must be positive");
    }

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .ok()
        .map(|value| value.parse::<u16>())
        .transpose()
        .context("Failed to parse PORT")?
        .unwrap_or(8086);

    let cors_origins = env::var("APP_CORS_ORIGINS")
        .ok()
        .map(|value| parse_origins(&value))
        .unwrap_or_else(default_origins);

    Ok(AppConfig {
        database_url,
        jwt_secret,
        token_ttl_seconds,
        host,
        port,
        cors_origins,
    })
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';' || c == ' ')
        .filter_map(|item| {
            let origin = item.trim();
            if origin.is_empty() {
                None
            } else {
                Some(origin.to_string())
            }
        })
        .collect()
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}
