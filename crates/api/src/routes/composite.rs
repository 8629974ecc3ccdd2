//! Product composite endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use common::ProductAggregate;
use composite::{CompositeService, HealthAggregator, RestIntegration};
use resources::{
    InMemoryProductRepository, InMemoryRecommendationRepository, InMemoryReviewRepository,
    ProductService, RecommendationService, ReviewService,
};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub composite_service: CompositeService<RestIntegration>,
    pub health_aggregator: HealthAggregator<RestIntegration>,
    pub product_service: ProductService<InMemoryProductRepository>,
    pub recommendation_service: RecommendationService<InMemoryRecommendationRepository>,
    pub review_service: ReviewService<InMemoryReviewRepository>,
}

/// GET /product-composite/{id} — fan-out read, assembled aggregate.
#[tracing::instrument(skip(state, uri))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Path(product_id): Path<i32>,
) -> Result<Json<ProductAggregate>, ApiError> {
    state
        .composite_service
        .get_aggregate(product_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(e, uri.path()))
}

/// POST /product-composite — enqueue CREATE events, 202 on acceptance.
#[tracing::instrument(skip(state, uri, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Json(body): Json<ProductAggregate>,
) -> Result<StatusCode, ApiError> {
    state
        .composite_service
        .create_aggregate(body)
        .await
        .map(|()| StatusCode::ACCEPTED)
        .map_err(|e| ApiError::new(e, uri.path()))
}

/// DELETE /product-composite/{id} — enqueue DELETE events, 202 on acceptance.
#[tracing::instrument(skip(state, uri))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Path(product_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state
        .composite_service
        .delete_aggregate(product_id)
        .await
        .map(|()| StatusCode::ACCEPTED)
        .map_err(|e| ApiError::new(e, uri.path()))
}
