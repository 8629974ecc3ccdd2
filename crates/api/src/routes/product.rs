//! Product read endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{OriginalUri, Path, State};
use common::Product;

use crate::error::ApiError;
use crate::routes::composite::AppState;

/// GET /product/{id} — single product owned by the product service.
#[tracing::instrument(skip(state, uri))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    Path(product_id): Path<i32>,
) -> Result<Json<Product>, ApiError> {
    state
        .product_service
        .get_product(product_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(e, uri.path()))
}
