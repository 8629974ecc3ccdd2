//! HTTP route handlers.

pub mod composite;
pub mod health;
pub mod metrics;
pub mod product;
pub mod recommendation;
pub mod review;
