//! Error taxonomy for the exchange core and its API surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::types::Qty;

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("resource '{0}' not found")]
    ResourceNotFound(String),

    #[error("insufficient balance: need {required:.2}, have {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("insufficient quantity to sell: requested {requested}, holding {held}")]
    InsufficientQuantity { requested: Qty, held: Qty },

    #[error("could not acquire the account lock in time")]
    LockTimeout,

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("authentication failed")]
    Auth,

    #[error("user not found")]
    UserNotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ExchangeError {
    fn status(&self) -> StatusCode {
        match self {
            ExchangeError::InvalidArgument(_)
            | ExchangeError::InsufficientFunds { .. }
            | ExchangeError::InsufficientQuantity { .. }
            | ExchangeError::Conflict(_) => StatusCode::BAD_REQUEST,
            ExchangeError::ResourceNotFound(_) | ExchangeError::UserNotFound => {
                StatusCode::NOT_FOUND
            }
            ExchangeError::Auth => StatusCode::UNAUTHORIZED,
            ExchangeError::LockTimeout => StatusCode::SERVICE_UNAVAILABLE,
            ExchangeError::Storage(_) | ExchangeError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ExchangeError {
    fn into_response(self) -> Response {
        if let ExchangeError::Storage(ref e) = self {
            tracing::error!(error = %e, "storage failure");
        }
        let status = self.status();
        // Don't leak driver details to clients.
        let detail = match self {
            ExchangeError::Storage(_) | ExchangeError::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
