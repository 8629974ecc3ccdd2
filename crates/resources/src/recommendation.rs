//! Recommendation service: repository contract, in-memory store, and
//! event handling.

use std::sync::Arc;

use async_trait::async_trait;
use common::{CompositeError, Recommendation};
use messaging::EventHandler;
use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::product::storage_error;

/// Storage contract for recommendations. Uniqueness is per
/// `(product_id, recommendation_id)`; list reads preserve insertion order.
#[async_trait]
pub trait RecommendationRepository: Send + Sync {
    async fn find_by_product_id(
        &self,
        product_id: i32,
    ) -> Result<Vec<Recommendation>, RepositoryError>;

    async fn find_one(
        &self,
        product_id: i32,
        recommendation_id: i32,
    ) -> Result<Option<Recommendation>, RepositoryError>;

    async fn insert(&self, recommendation: Recommendation) -> Result<(), RepositoryError>;

    /// Removes every recommendation for the product. Absent is Ok.
    async fn delete_by_product_id(&self, product_id: i32) -> Result<(), RepositoryError>;
}

/// In-memory recommendation store.
#[derive(Clone, Default)]
pub struct InMemoryRecommendationRepository {
    recommendations: Arc<RwLock<Vec<Recommendation>>>,
}

impl InMemoryRecommendationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.recommendations.read().await.len()
    }
}

#[async_trait]
impl RecommendationRepository for InMemoryRecommendationRepository {
    async fn find_by_product_id(
        &self,
        product_id: i32,
    ) -> Result<Vec<Recommendation>, RepositoryError> {
        Ok(self
            .recommendations
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
        recommendation_id: i32,
    ) -> Result<Option<Recommendation>, RepositoryError> {
        Ok(self
            .recommendations
            .read()
            .await
            .iter()
            .find(|r| r.product_id == product_id && r.recommendation_id == recommendation_id)
            .cloned())
    }

    async fn insert(&self, recommendation: Recommendation) -> Result<(), RepositoryError> {
        let mut recommendations = self.recommendations.write().await;
        if recommendations.iter().any(|r| {
            r.product_id == recommendation.product_id
                && r.recommendation_id == recommendation.recommendation_id
        }) {
            return Err(RepositoryError::DuplicateKey {
                key: format!(
                    "{}/{}",
                    recommendation.product_id, recommendation.recommendation_id
                ),
            });
        }
        recommendations.push(recommendation);
        Ok(())
    }

    async fn delete_by_product_id(&self, product_id: i32) -> Result<(), RepositoryError> {
        self.recommendations
            .write()
            .await
            .retain(|r| r.product_id != product_id);
        Ok(())
    }
}

/// Owns all recommendation state transitions. Same idempotency rules as
/// the product service; DELETE removes every recommendation for the
/// product id in one transition.
#[derive(Clone)]
pub struct RecommendationService<R> {
    repository: R,
    service_address: String,
}

impl<R: RecommendationRepository> RecommendationService<R> {
    pub fn new(repository: R, service_address: impl Into<String>) -> Self {
        Self {
            repository,
            service_address: service_address.into(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_recommendations(
        &self,
        product_id: i32,
    ) -> Result<Vec<Recommendation>, CompositeError> {
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
        for recommendation in &mut list {
            recommendation.service_address = self.service_address.clone();
        }

        tracing::debug!(product_id, size = list.len(), "recommendations read");
        Ok(list)
    }

    #[tracing::instrument(
        skip(self, body),
        fields(product_id = body.product_id, recommendation_id = body.recommendation_id)
    )]
    pub async fn create_recommendation(&self, body: Recommendation) -> Result<(), CompositeError> {
        if body.product_id < 1 {
            return Err(CompositeError::InvalidInput(format!(
                "Invalid productId: {}",
                body.product_id
            )));
        }

        if let Some(existing) = self
            .repository
            .find_one(body.product_id, body.recommendation_id)
            .await
            .map_err(storage_error)?
        {
            if existing.same_content(&body) {
                tracing::debug!("create already applied, no-op");
                return Ok(());
            }
            return Err(duplicate_key(body.product_id, body.recommendation_id));
        }

        let (product_id, recommendation_id) = (body.product_id, body.recommendation_id);
        self.repository.insert(body).await.map_err(|e| match e {
            RepositoryError::DuplicateKey { .. } => duplicate_key(product_id, recommendation_id),
            other => storage_error(other),
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_recommendations(&self, product_id: i32) -> Result<(), CompositeError> {
        self.repository
            .delete_by_product_id(product_id)
            .await
            .map_err(storage_error)
    }
}

fn duplicate_key(product_id: i32, recommendation_id: i32) -> CompositeError {
    CompositeError::InvalidInput(format!(
        "Duplicate key, Product Id: {product_id}, Recommendation Id: {recommendation_id}"
    ))
}

#[async_trait]
impl<R> EventHandler for RecommendationService<R>
where
    R: RecommendationRepository + Clone + 'static,
{
    type Payload = Recommendation;

    async fn on_create(&self, _key: i32, payload: Recommendation) -> Result<(), CompositeError> {
        self.create_recommendation(payload).await
    }

    async fn on_delete(&self, key: i32) -> Result<(), CompositeError> {
        self.delete_recommendations(key).await
    }
}
