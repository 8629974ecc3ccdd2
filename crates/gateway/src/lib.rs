//! Outbound HTTP gateway for the three downstream resource services.
//!
//! All reads and health probes leave the composite layer through
//! [`RestGateway`], which owns the per-call timeout and the translation
//! from transport failures into the domain error taxonomy. The gateway
//! never swallows an error; degrading a failed sub-resource read into an
//! empty list is the aggregation layer's decision, not this one's.

use std::time::Duration;

use common::{CompositeError, HealthStatus, HttpErrorInfo};
use serde::de::DeserializeOwned;

/// HTTP client for downstream reads and health probes.
///
/// Error mapping for non-2xx responses carrying the shared
/// [`HttpErrorInfo`] body: 404 becomes [`CompositeError::NotFound`] and
/// 422 becomes [`CompositeError::InvalidInput`], both with the message
/// extracted from the body. Everything else, including transport
/// failures and timeouts, becomes [`CompositeError::Unexpected`], logged
/// at warn and returned unchanged.
#[derive(Clone)]
pub struct RestGateway {
    client: reqwest::Client,
}

impl RestGateway {
    /// Builds a gateway whose every call is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CompositeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompositeError::Unexpected(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetches a single resource body.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, CompositeError> {
        tracing::debug!(%url, "calling downstream GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::transport_error(url, &e))?;

        let response = Self::check_status(url, response).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "malformed downstream response body");
            CompositeError::Unexpected(format!("malformed response from {url}: {e}"))
        })
    }

    /// Fetches a list resource body.
    pub async fn get_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, CompositeError> {
        self.get::<Vec<T>>(url).await
    }

    /// Probes a health endpoint. Never errors: any failure, including a
    /// timeout, converts to a down status carrying the reason.
    pub async fn get_health(&self, url: &str) -> HealthStatus {
        tracing::debug!(%url, "calling downstream health probe");

        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => HealthStatus::up(),
            Ok(response) => HealthStatus::down(format!("HTTP {}", response.status().as_u16())),
            Err(e) => HealthStatus::down(e.to_string()),
        }
    }

    fn transport_error(url: &str, e: &reqwest::Error) -> CompositeError {
        tracing::warn!(%url, error = %e, "downstream transport failure");
        CompositeError::Unexpected(format!("transport failure calling {url}: {e}"))
    }

    async fn check_status(
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CompositeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        // The downstream owners answer domain errors with a shared wire
        // format; fall back to the raw status line when the body is not it.
        let message = serde_json::from_str::<HttpErrorInfo>(&body)
            .map(|info| info.message)
            .unwrap_or_else(|_| format!("HTTP {status} from {url}"));

        match status.as_u16() {
            404 => Err(CompositeError::NotFound(message)),
            422 => Err(CompositeError::InvalidInput(message)),
            _ => {
                tracing::warn!(%url, %status, body = %body, "unexpected downstream HTTP error");
                Err(CompositeError::Unexpected(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use common::Product;

    async fn not_found_handler() -> impl IntoResponse {
        (
            StatusCode::NOT_FOUND,
            Json(HttpErrorInfo::new(
                404,
                "No product found for productId: 13",
                "/product/13",
            )),
        )
    }

    async fn invalid_handler() -> impl IntoResponse {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(HttpErrorInfo::new(422, "Invalid productId: -1", "/product/-1")),
        )
    }

    async fn flaky_handler() -> impl IntoResponse {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    async fn slow_handler() -> impl IntoResponse {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(Product::new(1, "late", 1))
    }

    async fn garbage_handler() -> impl IntoResponse {
        "not json at all"
    }

    /// Serves a canned downstream on an ephemeral port.
    async fn spawn_downstream() -> String {
        let app = axum::Router::new()
            .route("/product/1", get(|| async { Json(Product::new(1, "p1", 100)) }))
            .route(
                "/recommendation",
                get(|| async {
                    Json(vec![
                        common::Recommendation::new(1, 1, "a1", 3, "ok"),
                        common::Recommendation::new(1, 2, "a2", 4, "good"),
                    ])
                }),
            )
            .route("/product/13", get(not_found_handler))
            .route("/product/-1", get(invalid_handler))
            .route("/product/500", get(flaky_handler))
            .route("/product/slow", get(slow_handler))
            .route("/product/garbage", get(garbage_handler))
            .route("/health", get(|| async { "ok" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn gateway() -> RestGateway {
        RestGateway::new(Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn get_deserializes_a_resource() {
        let base = spawn_downstream().await;
        let product: Product = gateway().get(&format!("{base}/product/1")).await.unwrap();
        assert_eq!(product.product_id, 1);
        assert_eq!(product.name, "p1");
        assert_eq!(product.weight, 100);
    }

    #[tokio::test]
    async fn get_list_preserves_source_order() {
        let base = spawn_downstream().await;
        let recs: Vec<common::Recommendation> = gateway()
            .get_list(&format!("{base}/recommendation?productId=1"))
            .await
            .unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].recommendation_id, 1);
        assert_eq!(recs[1].recommendation_id, 2);
    }

    #[tokio::test]
    async fn maps_404_to_not_found_with_downstream_message() {
        let base = spawn_downstream().await;
        let result: Result<Product, _> = gateway().get(&format!("{base}/product/13")).await;
        assert_eq!(
            result.unwrap_err(),
            CompositeError::NotFound("No product found for productId: 13".into())
        );
    }

    #[tokio::test]
    async fn maps_422_to_invalid_input_with_downstream_message() {
        let base = spawn_downstream().await;
        let result: Result<Product, _> = gateway().get(&format!("{base}/product/-1")).await;
        assert_eq!(
            result.unwrap_err(),
            CompositeError::InvalidInput("Invalid productId: -1".into())
        );
    }

    #[tokio::test]
    async fn maps_5xx_to_unexpected() {
        let base = spawn_downstream().await;
        let result: Result<Product, _> = gateway().get(&format!("{base}/product/500")).await;
        assert!(matches!(result, Err(CompositeError::Unexpected(_))));
    }

    #[tokio::test]
    async fn timeout_is_a_transport_failure() {
        let base = spawn_downstream().await;
        let result: Result<Product, _> = gateway().get(&format!("{base}/product/slow")).await;
        assert!(matches!(result, Err(CompositeError::Unexpected(_))));
    }

    #[tokio::test]
    async fn malformed_success_body_is_unexpected() {
        let base = spawn_downstream().await;
        let result: Result<Product, _> = gateway().get(&format!("{base}/product/garbage")).await;
        assert!(matches!(result, Err(CompositeError::Unexpected(_))));
    }

    #[tokio::test]
    async fn health_probe_up_and_down() {
        let base = spawn_downstream().await;
        let gw = gateway();

        assert!(gw.get_health(&format!("{base}/health")).await.up);

        // Unreachable port: down with a detail, never an error.
        let status = gw.get_health("http://127.0.0.1:1/health").await;
        assert!(!status.up);
        assert!(status.detail.is_some());
    }
}
