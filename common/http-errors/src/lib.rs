use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Uniform `{success, data, message}` envelope returned by every handler.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: message.into(),
        })
    }
}

impl ApiResponse<()> {
    /// Success envelope with no payload.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: message.into(),
        })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Boundary error taxonomy. Each variant maps to one HTTP status and one
/// fixed user-visible message; internal detail stays in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },
    #[error("{message}")]
    Unauthorized {
        code: &'static str,
        message: &'static str,
    },
    #[error("You do not have permission to perform this action")]
    Forbidden,
    #[error("{message}")]
    NotFound {
        code: &'static str,
        message: &'static str,
    },
    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: &'static str,
    },
    #[error("Internal server error")]
    Internal { detail: String },
}

impl ApiError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        Self::Internal {
            detail: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { code, .. }
            | ApiError::Unauthorized { code, .. }
            | ApiError::NotFound { code, .. }
            | ApiError::Conflict { code, .. } => code,
            ApiError::Forbidden => "forbidden",
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { detail } = &self {
            error!(%detail, "request failed with internal error");
        }

        let status = self.status();
        let code = self.code();
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            message: self.to_string(),
        };

        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(code) {
            resp.headers_mut().insert("X-Error-Code", val);
        }
        resp
    }
}
