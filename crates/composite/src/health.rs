//! Health aggregation across the three downstream services.

use std::sync::Arc;

use common::CompositeHealth;

use crate::integration::CompositeIntegration;

/// Composes one health status out of the three downstream probes.
///
/// The probes race concurrently and are infallible by the integration
/// contract: a dead downstream downgrades only its own entry, never the
/// other probes. Nothing is cached; every call probes again.
pub struct HealthAggregator<I> {
    integration: Arc<I>,
}

impl<I: CompositeIntegration> HealthAggregator<I> {
    pub fn new(integration: Arc<I>) -> Self {
        Self { integration }
    }

    #[tracing::instrument(skip(self))]
    pub async fn composite_health(&self) -> CompositeHealth {
        let (product, recommendation, review) = tokio::join!(
            self.integration.product_health(),
            self.integration.recommendation_health(),
            self.integration.review_health(),
        );

        let health = CompositeHealth::new(product, recommendation, review);
        if !health.up {
            tracing::warn!(
                product = health.product.up,
                recommendation = health.recommendation.up,
                review = health.review.up,
                "composite health is down"
            );
        }
        health
    }
}
