//! The three downstream resource owners.
//!
//! Each resource type (product, recommendation, review) gets a repository
//! trait, an in-memory repository, and a service that enforces
//! validation, key uniqueness, and idempotent event application. The
//! composite layer never touches these stores directly: reads arrive over
//! HTTP through the gateway and writes arrive as events on the resource's
//! channel.

pub mod error;
pub mod product;
pub mod recommendation;
pub mod review;

pub use error::RepositoryError;
pub use product::{InMemoryProductRepository, ProductRepository, ProductService};
pub use recommendation::{
    InMemoryRecommendationRepository, RecommendationRepository, RecommendationService,
};
pub use review::{InMemoryReviewRepository, ReviewRepository, ReviewService};
