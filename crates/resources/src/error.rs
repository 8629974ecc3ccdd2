//! Repository error types.

use thiserror::Error;

/// Errors reported by a resource repository.
///
/// Repositories are a black-box contract: the services only care about
/// key collisions, which they translate to the duplicate-key domain
/// error, and everything else, which is unexpected.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The uniqueness constraint for the resource was violated.
    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },

    /// Any other storage failure.
    #[error("storage failure: {0}")]
    Storage(String),
}
