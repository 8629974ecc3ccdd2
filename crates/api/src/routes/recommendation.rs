//! Recommendation read endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{OriginalUri, Query, State};
use common::Recommendation;
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::composite::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductIdQuery {
    #[serde(rename = "productId")]
    pub product_id: i32,
}

/// GET /recommendation?productId={id} — all recommendations for a product.
#[tracing::instrument(skip(state, uri))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ProductIdQuery>,
) -> Result<Json<Vec<Recommendation>>, ApiError> {
    state
        .recommendation_service
        .get_recommendations(query.product_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(e, uri.path()))
}
