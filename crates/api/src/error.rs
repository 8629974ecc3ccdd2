//! API error type with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::{CompositeError, HttpErrorInfo};

/// A domain error paired with the request path it occurred on.
///
/// Every error response on the wire carries an [`HttpErrorInfo`] body,
/// so handlers wrap the [`CompositeError`] they get from the services
/// together with the path of the request that triggered it.
#[derive(Debug)]
pub struct ApiError {
    error: CompositeError,
    path: String,
}

impl ApiError {
    pub fn new(error: CompositeError, path: impl Into<String>) -> Self {
        Self {
            error,
            path: path.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.http_status();
        if status >= 500 {
            tracing::error!(error = %self.error, path = %self.path, "internal server error");
        }

        let body = HttpErrorInfo::new(status, self.error.to_string(), self.path);
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn not_found_maps_to_404_with_error_body() {
        let err = ApiError::new(
            CompositeError::NotFound("No product found for productId: 13".into()),
            "/product-composite/13",
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["httpStatus"], 404);
        assert_eq!(json["message"], "No product found for productId: 13");
        assert_eq!(json["path"], "/product-composite/13");
    }

    #[tokio::test]
    async fn invalid_input_maps_to_422() {
        let err = ApiError::new(
            CompositeError::InvalidInput("Invalid productId: -1".into()),
            "/product-composite/-1",
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unexpected_maps_to_500() {
        let err = ApiError::new(
            CompositeError::Unexpected("publish queue full".into()),
            "/product-composite",
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
