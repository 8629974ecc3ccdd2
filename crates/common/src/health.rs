//! Health status types.

use serde::{Deserialize, Serialize};

/// Health of a single downstream service. Computed on demand, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthStatus {
    pub fn up() -> Self {
        Self {
            up: true,
            detail: None,
        }
    }

    pub fn down(detail: impl Into<String>) -> Self {
        Self {
            up: false,
            detail: Some(detail.into()),
        }
    }
}

/// Aggregated health across the three downstream services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeHealth {
    pub up: bool,
    pub product: HealthStatus,
    pub recommendation: HealthStatus,
    pub review: HealthStatus,
}

impl CompositeHealth {
    /// Composite is up iff every entry is up.
    pub fn new(product: HealthStatus, recommendation: HealthStatus, review: HealthStatus) -> Self {
        Self {
            up: product.up && recommendation.up && review.up,
            product,
            recommendation,
            review,
        }
    }
}
