//! End-to-end tests for the composite server.
//!
//! Each test starts the full application on an ephemeral port with the
//! downstream service URLs pointed back at itself, which is exactly the
//! single-process deployment: composite reads go over real HTTP to the
//! resource endpoints in the same server, and writes travel through the
//! publisher pool, the in-memory bus, and the consumer tasks before
//! they become readable.

use std::sync::OnceLock;
use std::time::Duration;

use api::config::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Starts the app on an ephemeral port and returns its base URL.
async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("no local addr");
    let base_url = format!("http://{addr}");

    let config = Config {
        host: addr.ip().to_string(),
        port: addr.port(),
        product_service_url: base_url.clone(),
        recommendation_service_url: base_url.clone(),
        review_service_url: base_url.clone(),
        publish_pool_size: 4,
        publish_queue_depth: 16,
        request_timeout_ms: 2000,
        log_level: "warn".to_string(),
    };

    let state = api::create_default_state(&config).expect("failed to build state");
    let app = api::create_app(state, get_metrics_handle());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    // Give the consumer tasks a beat to subscribe before the first publish.
    tokio::time::sleep(Duration::from_millis(50)).await;
    base_url
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn aggregate_body(product_id: i32) -> serde_json::Value {
    serde_json::json!({
        "productId": product_id,
        "name": format!("product {product_id}"),
        "weight": 123,
        "recommendations": [
            { "recommendationId": 1, "author": "author 1", "rate": 4 },
            { "recommendationId": 2, "author": "author 2", "rate": 2 }
        ],
        "reviews": [
            { "reviewId": 1, "author": "author 1", "subject": "subject 1" }
        ]
    })
}

/// Polls until the closure returns `Some`, or panics after two seconds.
async fn eventually<T, F, Fut>(mut probe: F) -> T
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Option<T>>,
{
    for _ in 0..80 {
        if let Some(value) = probe().await {
            return value;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("condition not reached within two seconds");
}

/// Builds the router without binding a socket, for tests whose requests
/// never leave the process.
fn setup_app() -> axum::Router {
    let state = api::create_default_state(&Config::default()).expect("failed to build state");
    api::create_app(state, get_metrics_handle())
}

#[tokio::test]
async fn health_check_is_ok() {
    let app = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn composite_health_reports_all_downstreams_up() {
    let base = spawn_server().await;

    let response = client()
        .get(format!("{base}/health/composite"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["up"], true);
    assert_eq!(json["product"]["up"], true);
    assert_eq!(json["recommendation"]["up"], true);
    assert_eq!(json["review"]["up"], true);
}

#[tokio::test]
async fn invalid_product_id_is_unprocessable() {
    // Validation fires before any downstream call, so no socket is needed.
    let app = setup_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/product-composite/-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["httpStatus"], 422);
    assert_eq!(json["message"], "Invalid productId: -1");
    assert_eq!(json["path"], "/product-composite/-1");
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let base = spawn_server().await;

    let response = client()
        .get(format!("{base}/product-composite/13"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["message"], "No product found for productId: 13");
    assert_eq!(json["path"], "/product-composite/13");
}

#[tokio::test]
async fn create_then_read_then_delete_round_trip() {
    let base = spawn_server().await;
    let client = client();

    let response = client
        .post(format!("{base}/product-composite"))
        .json(&aggregate_body(1))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    // The write is asynchronous: poll the read side until the events land.
    let aggregate = eventually(|| {
        let client = client.clone();
        let url = format!("{base}/product-composite/1");
        async move {
            let response = client.get(url).send().await.ok()?;
            if response.status() == 200 {
                response.json::<serde_json::Value>().await.ok()
            } else {
                None
            }
        }
    })
    .await;

    assert_eq!(aggregate["productId"], 1);
    assert_eq!(aggregate["name"], "product 1");
    assert_eq!(aggregate["weight"], 123);
    assert_eq!(aggregate["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(aggregate["recommendations"][0]["rate"], 4);
    assert_eq!(aggregate["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(aggregate["reviews"][0]["subject"], "subject 1");
    assert_ne!(aggregate["serviceAddresses"]["product"], "");

    // The resource endpoints serve the same state directly.
    let product: serde_json::Value = client
        .get(format!("{base}/product/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["name"], "product 1");

    let recommendations: serde_json::Value = client
        .get(format!("{base}/recommendation?productId=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(recommendations.as_array().unwrap().len(), 2);

    let response = client
        .delete(format!("{base}/product-composite/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    eventually(|| {
        let client = client.clone();
        let url = format!("{base}/product-composite/1");
        async move {
            let response = client.get(url).send().await.ok()?;
            (response.status() == 404).then_some(())
        }
    })
    .await;

    // Sub-resources are gone with the product.
    let recommendations: serde_json::Value = client
        .get(format!("{base}/recommendation?productId=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(recommendations.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_is_idempotent_under_redelivery() {
    let base = spawn_server().await;
    let client = client();

    let body = aggregate_body(7);
    for _ in 0..2 {
        let response = client
            .post(format!("{base}/product-composite"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 202);
    }

    let aggregate = eventually(|| {
        let client = client.clone();
        let url = format!("{base}/product-composite/7");
        async move {
            let response = client.get(url).send().await.ok()?;
            if response.status() == 200 {
                response.json::<serde_json::Value>().await.ok()
            } else {
                None
            }
        }
    })
    .await;

    // The identical second submission must not duplicate sub-resources.
    assert_eq!(aggregate["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(aggregate["reviews"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_of_absent_product_is_accepted() {
    let base = spawn_server().await;

    let response = client()
        .delete(format!("{base}/product-composite/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
}

#[tokio::test]
async fn metrics_endpoint_renders() {
    let base = spawn_server().await;
    let client = client();

    let response = client
        .post(format!("{base}/product-composite"))
        .json(&aggregate_body(42))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);

    // The counters move once the publisher workers have drained the queue.
    eventually(|| {
        let client = client.clone();
        let url = format!("{base}/metrics");
        async move {
            let response = client.get(url).send().await.ok()?;
            let body = response.text().await.ok()?;
            body.contains("events_published_total").then_some(())
        }
    })
    .await;
}
