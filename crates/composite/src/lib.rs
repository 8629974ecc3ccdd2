//! Composite aggregation layer.
//!
//! [`CompositeService`] is the orchestration core: concurrent fan-out
//! reads with a partial-response policy on the non-anchor resources, and
//! event-emitting writes that return on acceptance, not application.
//! [`HealthAggregator`] composes the three downstream health probes.
//! Both talk to the outside world only through the
//! [`CompositeIntegration`] trait, whose production implementation,
//! [`RestIntegration`], pairs the HTTP gateway for reads with the
//! bounded event publisher for writes.

pub mod health;
pub mod integration;
pub mod service;

pub use health::HealthAggregator;
pub use integration::{CompositeIntegration, RestIntegration};
pub use service::{CompositeService, build_aggregate};
