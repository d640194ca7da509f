//! Error types for the grantflow library

use thiserror::Error;

/// Result type alias for grantflow operations
pub type GrantResult<T> = Result<T, GrantError>;

/// Main error type for the grantflow library
#[derive(Error, Debug)]
pub enum GrantError {
    /// A launch was attempted on a channel that already holds a pending
    /// request. Non-fatal: the new request is dropped and the pending one
    /// keeps the channel; the caller retries after it resolves.
    #[error("channel '{channel}' already has a pending request")]
    ChannelBusy {
        /// Name of the rejected channel
        channel: &'static str,
    },

    /// The interaction backing a channel went away before delivering its
    /// result.
    #[error("channel '{channel}' closed before delivering a result")]
    ChannelClosed {
        /// Name of the channel that closed
        channel: &'static str,
    },

    /// A capability status query failed
    #[error("capability oracle failed for '{capability}': {message}")]
    Oracle {
        /// Capability the query was about
        capability: String,
        /// What went wrong
        message: String,
    },

    /// A request was malformed or missing required data
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A response arrived without a usable body
    #[error("response body is absent")]
    EmptyResponseBody,

    /// A transfer failed after the exchange started
    #[error("transfer failed: {message}")]
    Transfer {
        /// What went wrong
        message: String,
    },

    /// HTTP client errors
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Filesystem errors during a transfer
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GrantError {
    /// Create an oracle error
    pub fn oracle(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Oracle {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Create a transfer error
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer {
            message: message.into(),
        }
    }

    /// Whether this error is the reentrant-launch protocol violation
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::ChannelBusy { .. })
    }
}
