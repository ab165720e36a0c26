use thiserror::Error;

/// Errors surfaced by the menu pipeline.
///
/// `Clone` so a rejected single-flight load can be handed to every caller
/// that shares it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("network failure on {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("malformed response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("cyclic menu hierarchy at record {0}")]
    CyclicHierarchy(String),

    #[error("role name already in use: {0}")]
    DuplicateRoleName(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MenuError {
    pub fn network(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Network {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }

    /// True for failures raised by the transport rather than by the data.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Status { .. } | Self::Decode { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MenuError>;
