//! Shared contracts for the product composite platform.
//!
//! Resource models, the composite aggregate, the event envelope, the
//! health types, and the domain error taxonomy used by every other crate.

pub mod error;
pub mod event;
pub mod health;
pub mod model;

pub use error::CompositeError;
pub use event::{
    Event, EventType, PRODUCTS_CHANNEL, RECOMMENDATIONS_CHANNEL, REVIEWS_CHANNEL,
};
pub use health::{CompositeHealth, HealthStatus};
pub use model::{
    HttpErrorInfo, Product, ProductAggregate, Recommendation, RecommendationSummary, Review,
    ReviewSummary, ServiceAddresses,
};
