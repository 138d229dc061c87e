/// Runtime configuration for token signing and verification.
///
/// One process-wide HMAC secret covers both directions; the service fails
/// at startup when the secret is absent, never per-request.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared HS256 signing secret.
    pub secret: String,
    /// Access token lifetime in seconds.
    pub ttl_seconds: i64,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
}

impl TokenConfig {
    /// Construct config with sensible defaults (1 hour TTL, 30 second leeway).
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds: 3600,
            leeway_seconds: 30,
        }
    }

    /// Adjust the token lifetime.
    pub fn with_ttl(mut self, seconds: i64) -> Self {
        self.ttl_seconds = seconds;
        self
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}
