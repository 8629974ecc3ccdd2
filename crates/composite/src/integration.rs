//! Downstream integration: one generic seam for reads, writes, and health.

use async_trait::async_trait;
use common::{
    CompositeError, Event, HealthStatus, PRODUCTS_CHANNEL, Product, RECOMMENDATIONS_CHANNEL,
    REVIEWS_CHANNEL, Recommendation, Review,
};
use gateway::RestGateway;
use messaging::{EventPublisher, PublishError};

/// Everything the composite layer needs from the three resource owners.
///
/// Reads return domain errors untranslated; the aggregation service
/// decides which of them degrade. Writes are fire-and-forget event
/// submissions: `Ok` means accepted for delivery, never applied. Health
/// probes are infallible by contract.
#[async_trait]
pub trait CompositeIntegration: Send + Sync {
    async fn get_product(&self, product_id: i32) -> Result<Product, CompositeError>;
    async fn get_recommendations(
        &self,
        product_id: i32,
    ) -> Result<Vec<Recommendation>, CompositeError>;
    async fn get_reviews(&self, product_id: i32) -> Result<Vec<Review>, CompositeError>;

    async fn create_product(&self, body: Product) -> Result<(), CompositeError>;
    async fn delete_product(&self, product_id: i32) -> Result<(), CompositeError>;
    async fn create_recommendation(&self, body: Recommendation) -> Result<(), CompositeError>;
    async fn delete_recommendations(&self, product_id: i32) -> Result<(), CompositeError>;
    async fn create_review(&self, body: Review) -> Result<(), CompositeError>;
    async fn delete_reviews(&self, product_id: i32) -> Result<(), CompositeError>;

    async fn product_health(&self) -> HealthStatus;
    async fn recommendation_health(&self) -> HealthStatus;
    async fn review_health(&self) -> HealthStatus;
}

/// Production integration: HTTP reads through the gateway, writes as
/// events on the per-resource channels.
pub struct RestIntegration {
    gateway: RestGateway,
    publisher: EventPublisher,
    product_service_url: String,
    recommendation_service_url: String,
    review_service_url: String,
}

impl RestIntegration {
    pub fn new(
        gateway: RestGateway,
        publisher: EventPublisher,
        product_service_url: impl Into<String>,
        recommendation_service_url: impl Into<String>,
        review_service_url: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            publisher,
            product_service_url: product_service_url.into(),
            recommendation_service_url: recommendation_service_url.into(),
            review_service_url: review_service_url.into(),
        }
    }
}

fn publish_failed(e: PublishError) -> CompositeError {
    CompositeError::Unexpected(e.to_string())
}

#[async_trait]
impl CompositeIntegration for RestIntegration {
    async fn get_product(&self, product_id: i32) -> Result<Product, CompositeError> {
        let url = format!("{}/product/{product_id}", self.product_service_url);
        self.gateway.get(&url).await
    }

    async fn get_recommendations(
        &self,
        product_id: i32,
    ) -> Result<Vec<Recommendation>, CompositeError> {
        let url = format!(
            "{}/recommendation?productId={product_id}",
            self.recommendation_service_url
        );
        self.gateway.get_list(&url).await
    }

    async fn get_reviews(&self, product_id: i32) -> Result<Vec<Review>, CompositeError> {
        let url = format!("{}/review?productId={product_id}", self.review_service_url);
        self.gateway.get_list(&url).await
    }

    async fn create_product(&self, body: Product) -> Result<(), CompositeError> {
        let event = Event::create(body.product_id, body);
        self.publisher
            .publish(PRODUCTS_CHANNEL, &event)
            .map_err(publish_failed)
    }

    async fn delete_product(&self, product_id: i32) -> Result<(), CompositeError> {
        self.publisher
            .publish(PRODUCTS_CHANNEL, &Event::<Product>::delete(product_id))
            .map_err(publish_failed)
    }

    async fn create_recommendation(&self, body: Recommendation) -> Result<(), CompositeError> {
        let event = Event::create(body.product_id, body);
        self.publisher
            .publish(RECOMMENDATIONS_CHANNEL, &event)
            .map_err(publish_failed)
    }

    async fn delete_recommendations(&self, product_id: i32) -> Result<(), CompositeError> {
        self.publisher
            .publish(
                RECOMMENDATIONS_CHANNEL,
                &Event::<Recommendation>::delete(product_id),
            )
            .map_err(publish_failed)
    }

    async fn create_review(&self, body: Review) -> Result<(), CompositeError> {
        let event = Event::create(body.product_id, body);
        self.publisher
            .publish(REVIEWS_CHANNEL, &event)
            .map_err(publish_failed)
    }

    async fn delete_reviews(&self, product_id: i32) -> Result<(), CompositeError> {
        self.publisher
            .publish(REVIEWS_CHANNEL, &Event::<Review>::delete(product_id))
            .map_err(publish_failed)
    }

    async fn product_health(&self) -> HealthStatus {
        self.gateway
            .get_health(&format!("{}/health", self.product_service_url))
            .await
    }

    async fn recommendation_health(&self) -> HealthStatus {
        self.gateway
            .get_health(&format!("{}/health", self.recommendation_service_url))
            .await
    }

    async fn review_health(&self) -> HealthStatus {
        self.gateway
            .get_health(&format!("{}/health", self.review_service_url))
            .await
    }
}
