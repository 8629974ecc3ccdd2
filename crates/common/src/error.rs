//! Domain error taxonomy shared by every component.

use thiserror::Error;

/// Errors that can occur anywhere in the composite layer.
///
/// The taxonomy is deliberately small: every downstream transport
/// failure, validation problem, or event protocol violation is folded
/// into one of these four kinds before it crosses a component boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// The anchor resource (or an explicitly requested entity) is missing.
    #[error("{0}")]
    NotFound(String),

    /// Validation failure or duplicate key.
    #[error("{0}")]
    InvalidInput(String),

    /// Malformed or unsupported event; a protocol violation that is fatal
    /// for the message being processed but never for the consumer.
    #[error("event processing failed: {0}")]
    EventProcessing(String),

    /// Any other transport or downstream failure.
    #[error("{0}")]
    Unexpected(String),
}

impl CompositeError {
    /// Returns the HTTP status code this error maps to on the wire.
    pub fn http_status(&self) -> u16 {
        match self {
            CompositeError::NotFound(_) => 404,
            CompositeError::InvalidInput(_) => 422,
            CompositeError::EventProcessing(_) | CompositeError::Unexpected(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(CompositeError::NotFound("x".into()).http_status(), 404);
        assert_eq!(CompositeError::InvalidInput("x".into()).http_status(), 422);
        assert_eq!(CompositeError::EventProcessing("x".into()).http_status(), 500);
        assert_eq!(CompositeError::Unexpected("x".into()).http_status(), 500);
    }

    #[test]
    fn display_uses_message_verbatim_for_domain_errors() {
        let err = CompositeError::NotFound("No product found for productId: 13".into());
        assert_eq!(err.to_string(), "No product found for productId: 13");
    }
}
