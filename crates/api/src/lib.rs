//! HTTP surface for the product composite layer.
//!
//! Mounts the composite aggregation endpoints, the three downstream
//! resource read endpoints (this is the single-process deployment, so
//! the resource owners live in the same binary), health probes and
//! Prometheus metrics, with structured logging (tracing) throughout.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use common::{
    CompositeError, PRODUCTS_CHANNEL, RECOMMENDATIONS_CHANNEL, REVIEWS_CHANNEL,
};
use composite::{CompositeService, HealthAggregator, RestIntegration};
use gateway::RestGateway;
use messaging::{EventBus, EventPublisher, InMemoryBus, run_consumer};
use metrics_exporter_prometheus::PrometheusHandle;
use resources::{
    InMemoryProductRepository, InMemoryRecommendationRepository, InMemoryReviewRepository,
    ProductService, RecommendationService, ReviewService,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::composite::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/health/composite", get(routes::health::composite))
        .route(
            "/product-composite/{id}",
            get(routes::composite::get).delete(routes::composite::delete),
        )
        .route(
            "/product-composite",
            axum::routing::post(routes::composite::create),
        )
        .route("/product/{id}", get(routes::product::get))
        .route("/recommendation", get(routes::recommendation::list))
        .route("/review", get(routes::review::list))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state: in-memory event bus, bounded
/// publisher pool, REST gateway, the three resource services, and the
/// composite services wired over them. Spawns one consumer task per
/// channel so enqueued events are applied to the owning service.
pub fn create_default_state(config: &Config) -> Result<Arc<AppState>, CompositeError> {
    let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
    let publisher = EventPublisher::new(
        bus.clone(),
        config.publish_pool_size,
        config.publish_queue_depth,
    );
    let gateway = RestGateway::new(Duration::from_millis(config.request_timeout_ms))?;

    let service_address = config.addr();
    let product_service = ProductService::new(
        InMemoryProductRepository::new(),
        service_address.clone(),
    );
    let recommendation_service = RecommendationService::new(
        InMemoryRecommendationRepository::new(),
        service_address.clone(),
    );
    let review_service =
        ReviewService::new(InMemoryReviewRepository::new(), service_address.clone());

    tokio::spawn(run_consumer(
        bus.clone(),
        PRODUCTS_CHANNEL,
        product_service.clone(),
    ));
    tokio::spawn(run_consumer(
        bus.clone(),
        RECOMMENDATIONS_CHANNEL,
        recommendation_service.clone(),
    ));
    tokio::spawn(run_consumer(
        bus.clone(),
        REVIEWS_CHANNEL,
        review_service.clone(),
    ));

    let integration = Arc::new(RestIntegration::new(
        gateway,
        publisher,
        config.product_service_url.clone(),
        config.recommendation_service_url.clone(),
        config.review_service_url.clone(),
    ));
    let composite_service = CompositeService::new(integration.clone(), service_address);
    let health_aggregator = HealthAggregator::new(integration);

    Ok(Arc::new(AppState {
        composite_service,
        health_aggregator,
        product_service,
        recommendation_service,
        review_service,
    }))
}
