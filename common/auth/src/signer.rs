use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

use crate::claims::ClaimsRepr;
use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};

/// Mints signed, time-limited bearer tokens bound to one user identity.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    ttl_seconds: i64,
}

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenSigner {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            ttl_seconds: config.ttl_seconds,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.ttl_seconds);

        let claims = ClaimsRepr {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: Some(now.timestamp()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Signing(err.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}
