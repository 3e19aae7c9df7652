//! Error types for the Resonance feedback engine
//!
//! This module provides structured error handling using thiserror for
//! error definitions and anyhow for propagation in the binary.
//!
//! Two situations are deliberately *not* errors: looking up a session id
//! that has never been seen (the engine creates the session instead), and
//! running out of unused probe questions (callers get `None` and fall back
//! to plain summarization).

use thiserror::Error;

/// Main error type for Resonance operations
#[derive(Error, Debug)]
pub enum ResonanceError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Inbound event rejected at the boundary (unmonitored or self-sent)
    #[error("Event ignored: {0}")]
    EventIgnored(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Downstream collaborator failed (generation, delivery, export)
    #[error("Downstream error: {0}")]
    Downstream(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Resonance operations
pub type Result<T> = std::result::Result<T, ResonanceError>;

/// Convert anyhow::Error to ResonanceError
impl From<anyhow::Error> for ResonanceError {
    fn from(err: anyhow::Error) -> Self {
        ResonanceError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResonanceError::EventIgnored("self-sent".to_string());
        assert_eq!(err.to_string(), "Event ignored: self-sent");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: ResonanceError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, ResonanceError::Other(_)));
    }
}
