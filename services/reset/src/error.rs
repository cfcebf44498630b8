use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Why a reset token was refused. Logged, never rendered: every reason maps
/// to the same 401 body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("no bearer token presented")]
    Missing,
    #[error("no token issued for identifier")]
    NotFound,
    #[error("token expired")]
    Expired,
    #[error("token mismatch")]
    Mismatch,
    #[error("token already consumed")]
    Consumed,
    #[error("account no longer exists")]
    UnknownAccount,
}

/// Password-reset domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ResetError {
    #[error("{0}")]
    Validation(String),
    #[error("no active challenge")]
    NoActiveChallenge,
    #[error("invalid code")]
    InvalidCode { remaining_attempts: u32 },
    #[error("unauthorized")]
    Unauthorized(TokenRejection),
    #[error("credential update failed")]
    DownstreamFailure(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ResetError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::NoActiveChallenge => "NO_ACTIVE_CHALLENGE",
            Self::InvalidCode { .. } => "INVALID_CODE",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::DownstreamFailure(_) => "DOWNSTREAM_FAILURE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ResetError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::NoActiveChallenge | Self::InvalidCode { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::DownstreamFailure(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are already traced where they are decided; only 5xx carry a cause
        // chain worth logging here.
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::DownstreamFailure(e) => {
                tracing::error!(error = %e, kind = "DOWNSTREAM_FAILURE", "credential store failed")
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::InvalidCode { remaining_attempts } = self {
            body["remaining_attempts"] = remaining_attempts.into();
        }
        (status, axum::Json(body)).into_response()
    }
}
