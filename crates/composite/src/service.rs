//! The composite aggregation service.

use std::sync::Arc;
use std::time::Instant;

use common::{
    CompositeError, Product, ProductAggregate, Recommendation, RecommendationSummary, Review,
    ReviewSummary, ServiceAddresses,
};

use crate::integration::CompositeIntegration;

/// Orchestrates the composite read and write paths.
///
/// Reads fan out to the three resource owners concurrently. The product
/// is the anchor: its errors propagate to the caller verbatim, and there
/// is no aggregate without it. Recommendation and review failures of any
/// kind degrade to an empty list so the caller still gets a partial
/// response.
///
/// Writes never call a downstream service. Each command becomes one
/// event per affected resource, and the method returns once every event
/// is accepted by the publisher. The caller observes "accepted", not
/// "applied": whether a downstream owner later rejects an event (say, a
/// duplicate key) is only visible through that owner's own read API.
pub struct CompositeService<I> {
    integration: Arc<I>,
    service_address: String,
}

impl<I: CompositeIntegration> CompositeService<I> {
    /// `service_address` identifies this composite node in the
    /// aggregate's address block.
    pub fn new(integration: Arc<I>, service_address: impl Into<String>) -> Self {
        Self {
            integration,
            service_address: service_address.into(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_aggregate(&self, product_id: i32) -> Result<ProductAggregate, CompositeError> {
        if product_id < 1 {
            return Err(CompositeError::InvalidInput(format!(
                "Invalid productId: {product_id}"
            )));
        }

        let started = Instant::now();

        let (product, recommendations, reviews) = tokio::join!(
            self.integration.get_product(product_id),
            self.integration.get_recommendations(product_id),
            self.integration.get_reviews(product_id),
        );

        // Anchor resource: no aggregate without it.
        let product = product?;

        let recommendations = recommendations.unwrap_or_else(|e| {
            metrics::counter!("composite_degraded_reads_total").increment(1);
            tracing::warn!(product_id, error = %e, "recommendation read degraded to empty");
            Vec::new()
        });
        let reviews = reviews.unwrap_or_else(|e| {
            metrics::counter!("composite_degraded_reads_total").increment(1);
            tracing::warn!(product_id, error = %e, "review read degraded to empty");
            Vec::new()
        });

        metrics::histogram!("composite_aggregate_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(build_aggregate(
            product,
            recommendations,
            reviews,
            &self.service_address,
        ))
    }

    /// Turns the aggregate into one CREATE event per affected resource
    /// and returns as soon as all of them are accepted for delivery.
    #[tracing::instrument(skip(self, body), fields(product_id = body.product_id))]
    pub async fn create_aggregate(&self, body: ProductAggregate) -> Result<(), CompositeError> {
        if body.product_id < 1 {
            return Err(CompositeError::InvalidInput(format!(
                "Invalid productId: {}",
                body.product_id
            )));
        }

        let product = Product::new(body.product_id, body.name.clone(), body.weight);
        self.integration.create_product(product).await?;

        for summary in &body.recommendations {
            let recommendation = Recommendation::new(
                body.product_id,
                summary.recommendation_id,
                summary.author.clone(),
                summary.rate,
                "",
            );
            self.integration.create_recommendation(recommendation).await?;
        }

        for summary in &body.reviews {
            let review = Review::new(
                body.product_id,
                summary.review_id,
                summary.author.clone(),
                summary.subject.clone(),
                "",
            );
            self.integration.create_review(review).await?;
        }

        tracing::debug!(
            product_id = body.product_id,
            recommendations = body.recommendations.len(),
            reviews = body.reviews.len(),
            "composite create accepted"
        );
        Ok(())
    }

    /// Emits one DELETE per resource channel; same accepted-only contract.
    #[tracing::instrument(skip(self))]
    pub async fn delete_aggregate(&self, product_id: i32) -> Result<(), CompositeError> {
        if product_id < 1 {
            return Err(CompositeError::InvalidInput(format!(
                "Invalid productId: {product_id}"
            )));
        }

        self.integration.delete_product(product_id).await?;
        self.integration.delete_recommendations(product_id).await?;
        self.integration.delete_reviews(product_id).await?;

        tracing::debug!(product_id, "composite delete accepted");
        Ok(())
    }
}

/// Assembles the composite view. Summary lists keep the order their
/// source returned; the review and recommendation addresses come from the
/// first element of the respective list, or stay empty.
pub fn build_aggregate(
    product: Product,
    recommendations: Vec<Recommendation>,
    reviews: Vec<Review>,
    composite_address: &str,
) -> ProductAggregate {
    let review_address = reviews
        .first()
        .map(|r| r.service_address.clone())
        .unwrap_or_default();
    let recommendation_address = recommendations
        .first()
        .map(|r| r.service_address.clone())
        .unwrap_or_default();

    let recommendation_summaries = recommendations
        .into_iter()
        .map(|r| RecommendationSummary {
            recommendation_id: r.recommendation_id,
            author: r.author,
            rate: r.rate,
        })
        .collect();
    let review_summaries = reviews
        .into_iter()
        .map(|r| ReviewSummary {
            review_id: r.review_id,
            author: r.author,
            subject: r.subject,
        })
        .collect();

    ProductAggregate {
        product_id: product.product_id,
        name: product.name,
        weight: product.weight,
        recommendations: recommendation_summaries,
        reviews: review_summaries,
        service_addresses: ServiceAddresses {
            composite: composite_address.to_string(),
            product: product.service_address,
            review: review_address,
            recommendation: recommendation_address,
        },
    }
}
