//! OS interaction launcher consumed by the result broker

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{CapabilityId, PromptResponse, SubTaskIntent, SubTaskResult};

/// Launches the platform's asynchronous authorization surfaces.
///
/// Each call corresponds to one user-visible interaction and resolves with
/// that interaction's single terminal result; real time is unbounded (the
/// user decides when). The broker guarantees at most one in-flight call per
/// channel.
#[async_trait]
pub trait PromptLauncher: Send + Sync {
    /// Show the OS capability prompt for exactly `capabilities`
    async fn launch_capability_prompt(&self, capabilities: Vec<CapabilityId>) -> PromptResponse;

    /// Launch a secondary task and resolve when control returns
    async fn launch_sub_task(&self, intent: SubTaskIntent) -> SubTaskResult;
}

/// Shared prompt launcher type
pub type SharedPromptLauncher = Arc<dyn PromptLauncher>;
