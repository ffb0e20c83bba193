//! Error-to-HTTP-status mapping for the API surface.

use axum::http::StatusCode;
use axum::response::IntoResponse;

use resource_exchange::error::ExchangeError;

#[test]
fn statuses_follow_the_api_contract() {
    let cases = [
        (
            ExchangeError::InvalidArgument("bad".into()),
            StatusCode::BAD_REQUEST,
        ),
        (
            ExchangeError::InsufficientFunds {
                required: 10.0,
                available: 1.0,
            },
            StatusCode::BAD_REQUEST,
        ),
        (
            ExchangeError::InsufficientQuantity {
                requested: 2.0,
                held: 1.0,
            },
            StatusCode::BAD_REQUEST,
        ),
        (
            ExchangeError::Conflict("duplicate".into()),
            StatusCode::BAD_REQUEST,
        ),
        (
            ExchangeError::ResourceNotFound("XYZ".into()),
            StatusCode::NOT_FOUND,
        ),
        // A valid token for a deleted user is a 404, not an auth failure.
        (ExchangeError::UserNotFound, StatusCode::NOT_FOUND),
        (ExchangeError::Auth, StatusCode::UNAUTHORIZED),
        (ExchangeError::LockTimeout, StatusCode::SERVICE_UNAVAILABLE),
        (
            ExchangeError::Storage(sqlx::Error::RowNotFound),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            ExchangeError::Internal("boom".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];
    for (err, expected) in cases {
        assert_eq!(err.into_response().status(), expected);
    }
}
