//! Client-visible error contract.
//!
//! Every failure leaves the service as `{message, code}` with the HTTP status
//! echoed in the body. The proxy controller is the only place that translates
//! internal failures into this shape; upstream payloads never pass through.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    pub code: u16,
}

/// Stable error taxonomy of the proxy controller. Validation failures carry
/// fixed enumerated messages; upstream auth failures are always reported with
/// the fixed authorization message instead of the raw 401.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VcsApiError {
    #[error("Vcs config is not found")]
    ConfigNotFound,

    #[error("Vcs id is required")]
    VcsIdRequired,

    #[error("This vcs id is not supported")]
    VcsNotSupported,

    #[error("Token is required")]
    TokenRequired,

    #[error("Path is required")]
    PathRequired,

    #[error("Branch is required")]
    BranchRequired,

    #[error("Repository is required")]
    RepositoryRequired,

    #[error("The service cannot authorize you. Check the token. You can add new token in the section Settings -> VCS")]
    Unauthorized,

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Internal(String),
}

impl VcsApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            VcsApiError::ConfigNotFound => StatusCode::NOT_FOUND,
            VcsApiError::VcsIdRequired
            | VcsApiError::VcsNotSupported
            | VcsApiError::TokenRequired
            | VcsApiError::PathRequired
            | VcsApiError::BranchRequired
            | VcsApiError::RepositoryRequired => StatusCode::BAD_REQUEST,
            VcsApiError::Unauthorized | VcsApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            VcsApiError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            code: self.status().as_u16(),
        }
    }
}

impl IntoResponse for VcsApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_echoed_in_the_body() {
        let body = VcsApiError::TokenRequired.body();
        assert_eq!(body.message, "Token is required");
        assert_eq!(body.code, 400);

        let body = VcsApiError::ConfigNotFound.body();
        assert_eq!(body.code, 404);
    }

    #[test]
    fn auth_failures_use_the_fixed_message_and_500() {
        let body = VcsApiError::Unauthorized.body();
        assert_eq!(body.code, 500);
        assert!(body.message.starts_with("The service cannot authorize you"));
    }

    #[test]
    fn upstream_errors_carry_their_status() {
        let err = VcsApiError::Upstream {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.body().message, "Bad Gateway");
    }

    #[test]
    fn invalid_upstream_status_falls_back_to_500() {
        let err = VcsApiError::Upstream {
            status: 42,
            message: "weird".to_string(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
