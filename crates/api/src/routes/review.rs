//! Review read endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{OriginalUri, Query, State};
use common::Review;

use crate::error::ApiError;
use crate::routes::composite::AppState;
use crate::routes::recommendation::ProductIdQuery;

/// GET /review?productId={id} — all reviews for a product.
#[tracing::instrument(skip(state, uri))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ProductIdQuery>,
) -> Result<Json<Vec<Review>>, ApiError> {
    state
        .review_service
        .get_reviews(query.product_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(e, uri.path()))
}
