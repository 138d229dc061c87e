use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use crate::claims::{Claims, ClaimsRepr};
use crate::config::TokenConfig;
use crate::error::AuthResult;

/// Validates bearer tokens against the process-wide secret.
///
/// Verification is a pure in-process computation; there is no revocation
/// list and no store access. Failure is always closed: bad signature,
/// malformed structure, elapsed expiry and a missing subject all reject.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds.into();
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<ClaimsRepr>(token, &self.decoding_key, &self.validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(subject = %claims.subject, "verified token successfully");
        Ok(claims)
    }
}
