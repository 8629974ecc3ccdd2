//! Review service: repository contract, in-memory store, and event handling.

use std::sync::Arc;

use async_trait::async_trait;
use common::{CompositeError, Review};
use messaging::EventHandler;
use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::product::storage_error;

/// Storage contract for reviews. Uniqueness is per
/// `(product_id, review_id)`; list reads preserve insertion order.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_product_id(&self, product_id: i32) -> Result<Vec<Review>, RepositoryError>;

    async fn find_one(
        &self,
        product_id: i32,
        review_id: i32,
    ) -> Result<Option<Review>, RepositoryError>;

    async fn insert(&self, review: Review) -> Result<(), RepositoryError>;

    /// Removes every review for the product. Absent is Ok.
    async fn delete_by_product_id(&self, product_id: i32) -> Result<(), RepositoryError>;
}

/// In-memory review store.
#[derive(Clone, Default)]
pub struct InMemoryReviewRepository {
    reviews: Arc<RwLock<Vec<Review>>>,
}

impl InMemoryReviewRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.reviews.read().await.len()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn find_by_product_id(&self, product_id: i32) -> Result<Vec<Review>, RepositoryError> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn find_one(
        &self,
        product_id: i32,
        review_id: i32,
    ) -> Result<Option<Review>, RepositoryError> {
        Ok(self
            .reviews
            .read()
            .await
            .iter()
            .find(|r| r.product_id == product_id && r.review_id == review_id)
            .cloned())
    }

    async fn insert(&self, review: Review) -> Result<(), RepositoryError> {
        let mut reviews = self.reviews.write().await;
        if reviews
            .iter()
            .any(|r| r.product_id == review.product_id && r.review_id == review.review_id)
        {
            return Err(RepositoryError::DuplicateKey {
                key: format!("{}/{}", review.product_id, review.review_id),
            });
        }
        reviews.push(review);
        Ok(())
    }

    async fn delete_by_product_id(&self, product_id: i32) -> Result<(), RepositoryError> {
        self.reviews
            .write()
            .await
            .retain(|r| r.product_id != product_id);
        Ok(())
    }
}

/// Owns all review state transitions. Same idempotency rules as the
/// product service; DELETE removes every review for the product id.
#[derive(Clone)]
pub struct ReviewService<R> {
    repository: R,
    service_address: String,
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(repository: R, service_address: impl Into<String>) -> Self {
        Self {
            repository,
            service_address: service_address.into(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_reviews(&self, product_id: i32) -> Result<Vec<Review>, CompositeError> {
        if product_id < 1 {
            return Err(CompositeError::InvalidInput(format!(
                "Invalid productId: {product_id}"
            )));
        }

        let mut list = self
            .repository
            .find_by_product_id(product_id)
            .await
            .map_err(storage_error)?;
        for review in &mut list {
            review.service_address = self.service_address.clone();
        }

        tracing::debug!(product_id, size = list.len(), "reviews read");
        Ok(list)
    }

    #[tracing::instrument(
        skip(self, body),
        fields(product_id = body.product_id, review_id = body.review_id)
    )]
    pub async fn create_review(&self, body: Review) -> Result<(), CompositeError> {
        if body.product_id < 1 {
            return Err(CompositeError::InvalidInput(format!(
                "Invalid productId: {}",
                body.product_id
            )));
        }

        if let Some(existing) = self
            .repository
            .find_one(body.product_id, body.review_id)
            .await
            .map_err(storage_error)?
        {
            if existing.same_content(&body) {
                tracing::debug!("create already applied, no-op");
                return Ok(());
            }
            return Err(duplicate_key(body.product_id, body.review_id));
        }

        let (product_id, review_id) = (body.product_id, body.review_id);
        self.repository.insert(body).await.map_err(|e| match e {
            RepositoryError::DuplicateKey { .. } => duplicate_key(product_id, review_id),
            other => storage_error(other),
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_reviews(&self, product_id: i32) -> Result<(), CompositeError> {
        self.repository
            .delete_by_product_id(product_id)
            .await
            .map_err(storage_error)
    }
}

fn duplicate_key(product_id: i32, review_id: i32) -> CompositeError {
    CompositeError::InvalidInput(format!(
        "Duplicate key, Product Id: {product_id}, Review Id: {review_id}"
    ))
}

#[async_trait]
impl<R> EventHandler for ReviewService<R>
where
    R: ReviewRepository + Clone + 'static,
{
    type Payload = Review;

    async fn on_create(&self, _key: i32, payload: Review) -> Result<(), CompositeError> {
        self.create_review(payload).await
    }

    async fn on_delete(&self, key: i32) -> Result<(), CompositeError> {
        self.delete_reviews(key).await
    }
}
