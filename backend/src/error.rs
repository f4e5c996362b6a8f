use axum::{Json, http::StatusCode};
use shared::ApiError;

/// Malformed client input, reported before the store is touched.
pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            message: message.into(),
        }),
    )
}

pub fn not_found(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError {
            message: message.into(),
        }),
    )
}

/// Unexpected failure: full detail goes to the log, the client gets a
/// generic message.
pub fn internal_error(detail: impl std::fmt::Display) -> (StatusCode, Json<ApiError>) {
    tracing::error!("internal error: {detail}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError {
            message: "Internal server error".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_hides_detail() {
        let (status, Json(body)) = internal_error("lock poisoned at line 42");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn bad_request_keeps_message() {
        let (status, Json(body)) = bad_request("Invalid parking spot ID");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Invalid parking spot ID");
    }
}
