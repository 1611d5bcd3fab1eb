//! Error types for the Casa client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Casa crate.
///
/// The first four variants mirror the failure modes of the remote property
/// service; the rest cover local concerns (configuration, files, encoding).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CasaError {
    /// Transport failure: no response was received (includes timeouts).
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("Service error: {message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// A structured block embedded in a chat reply could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// On-demand image generation failed.
    #[error("Image generation failed: {0}")]
    Generation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },
}

impl CasaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Service error
    pub fn service(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    /// Creates a Parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// HTTP status carried by a `Service` error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => *status,
            _ => None,
        }
    }

    /// Human-readable text shown to the user when an operation fails.
    ///
    /// Service errors surface the backend's own message; transport errors get
    /// a fixed hint instead of the raw transport diagnostics.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Could not reach the property service. Check your connection and try again."
                    .to_string()
            }
            Self::Service { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Service { .. } => "Search failed".to_string(),
            Self::Generation(_) => "Image generation failed.".to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for CasaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for CasaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CasaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, CasaError>`.
pub type Result<T> = std::result::Result<T, CasaError>;
