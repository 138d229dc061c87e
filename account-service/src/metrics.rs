use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct AccountMetrics {
    registry: Registry,
    login_attempts: IntCounterVec,
    upgrade_decisions: IntCounterVec,
}

impl AccountMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let login_attempts = IntCounterVec::new(
            Opts::new(
                "account_login_attempts_total",
                "Count of login attempts grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;

        let upgrade_decisions = IntCounterVec::new(
            Opts::new(
                "account_upgrade_decisions_total",
                "Count of upgrade workflow decisions grouped by outcome",
            ),
            &["decision"],
        )?;
        registry.register(Box::new(upgrade_decisions.clone()))?;

        Ok(Self {
            registry,
            login_attempts,
            upgrade_decisions,
        })
    }

    pub fn login_attempt(&self, outcome: &str) {
        self.login_attempts.with_label_values(&[outcome]).inc();
    }

    pub fn upgrade_decision(&self, decision: &str) {
        self.upgrade_decisions.with_label_values(&[decision]).inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
