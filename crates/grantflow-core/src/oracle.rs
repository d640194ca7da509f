//! Capability status oracle

use std::sync::Arc;

use crate::error::GrantResult;
use crate::types::CapabilityId;

/// Point-in-time, side-effect-free view of the platform's capability state.
///
/// Both queries answer for the instant they are called; the coordinator
/// re-queries rather than caching. A failed query is absorbed by the
/// coordinator and never aborts a flow.
#[cfg_attr(test, mockall::automock)]
pub trait CapabilityOracle: Send + Sync {
    /// Whether the capability is currently granted
    fn is_granted(&self, capability: &CapabilityId) -> GrantResult<bool>;

    /// Whether a rationale should still be shown for the capability.
    ///
    /// `false` after a refusal means the user suppressed future prompts.
    fn should_show_rationale(&self, capability: &CapabilityId) -> GrantResult<bool>;
}

/// Shared capability oracle type
pub type SharedCapabilityOracle = Arc<dyn CapabilityOracle>;
