//! Resource models and the composite aggregate.
//!
//! Everything here crosses a service boundary and serializes camelCase to
//! stay compatible with the downstream wire contracts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product, owned by the product service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: i32,
    pub name: String,
    pub weight: i32,
    #[serde(default)]
    pub service_address: String,
}

impl Product {
    pub fn new(product_id: i32, name: impl Into<String>, weight: i32) -> Self {
        Self {
            product_id,
            name: name.into(),
            weight,
            service_address: String::new(),
        }
    }

    /// True when the two carry the same content, ignoring which node
    /// served them. Used for idempotent re-application of CREATE events.
    pub fn same_content(&self, other: &Product) -> bool {
        self.product_id == other.product_id
            && self.name == other.name
            && self.weight == other.weight
    }
}

/// A recommendation, owned by the recommendation service.
/// Unique per `(product_id, recommendation_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub product_id: i32,
    pub recommendation_id: i32,
    pub author: String,
    pub rate: i32,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub service_address: String,
}

impl Recommendation {
    pub fn new(
        product_id: i32,
        recommendation_id: i32,
        author: impl Into<String>,
        rate: i32,
        content: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            recommendation_id,
            author: author.into(),
            rate,
            content: content.into(),
            service_address: String::new(),
        }
    }

    pub fn same_content(&self, other: &Recommendation) -> bool {
        self.product_id == other.product_id
            && self.recommendation_id == other.recommendation_id
            && self.author == other.author
            && self.rate == other.rate
            && self.content == other.content
    }
}

/// A review, owned by the review service.
/// Unique per `(product_id, review_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub product_id: i32,
    pub review_id: i32,
    pub author: String,
    pub subject: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub service_address: String,
}

impl Review {
    pub fn new(
        product_id: i32,
        review_id: i32,
        author: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            review_id,
            author: author.into(),
            subject: subject.into(),
            content: content.into(),
            service_address: String::new(),
        }
    }

    pub fn same_content(&self, other: &Review) -> bool {
        self.product_id == other.product_id
            && self.review_id == other.review_id
            && self.author == other.author
            && self.subject == other.subject
            && self.content == other.content
    }
}

/// Projection of a recommendation inside the composite aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSummary {
    pub recommendation_id: i32,
    pub author: String,
    pub rate: i32,
}

/// Projection of a review inside the composite aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub review_id: i32,
    pub author: String,
    pub subject: String,
}

/// Which node served each part of an aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAddresses {
    pub composite: String,
    pub product: String,
    pub review: String,
    pub recommendation: String,
}

/// The composite view over one product and its sub-resources.
///
/// Built fresh for every read request and never persisted. Empty
/// summary lists mean either "no items" or "that sub-resource was
/// unavailable"; callers cannot tell the two apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAggregate {
    pub product_id: i32,
    pub name: String,
    pub weight: i32,
    #[serde(default)]
    pub recommendations: Vec<RecommendationSummary>,
    #[serde(default)]
    pub reviews: Vec<ReviewSummary>,
    #[serde(default)]
    pub service_addresses: ServiceAddresses,
}

/// Domain-error wire format, shared in both directions: produced by the
/// API layer for every error response and parsed by the gateway when a
/// downstream call fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpErrorInfo {
    pub http_status: u16,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub path: String,
}

impl HttpErrorInfo {
    pub fn new(http_status: u16, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_status,
            message: message.into(),
            timestamp: Utc::now(),
            path: path.into(),
        }
    }
}
