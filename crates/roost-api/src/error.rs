use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roost_core::error::CoreError;
use serde_json::json;

/// Boundary error wrapper. Both core error kinds surface as HTTP 400 with
/// the description in the body, matching the contract clients rely on.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": 400,
            "name": "System Error",
            "message": self.0.description(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_error_kinds_map_to_400() {
        let input = ApiError(CoreError::input("bad id")).into_response();
        assert_eq!(input.status(), StatusCode::BAD_REQUEST);

        let access = ApiError(CoreError::access("not allowed")).into_response();
        assert_eq!(access.status(), StatusCode::BAD_REQUEST);
    }
}
