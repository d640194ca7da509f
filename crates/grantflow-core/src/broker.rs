//! Single-slot asynchronous result channels
//!
//! The broker owns two independent channels, one for capability-grant
//! prompts and one for sub-task completions. Each channel holds at most one
//! pending request at a time; a second launch before the first resolves is
//! rejected, not queued.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::error::{GrantError, GrantResult};
use crate::launcher::SharedPromptLauncher;
use crate::types::{CapabilityId, PromptResponse, SubTaskIntent, SubTaskResult};

/// Name of the capability-grant-set channel, used in logs and errors
pub const CHANNEL_GRANTS: &str = "capability-grants";

/// Name of the sub-task-completion channel, used in logs and errors
pub const CHANNEL_SUB_TASK: &str = "sub-task";

/// Per-channel pending-result state.
///
/// A slot is busy only between a [`begin`](Self::begin) and the matching
/// [`complete`](Self::complete); the pending one-shot sender is the unique
/// owner of the eventual result.
pub struct ResultSlot<T> {
    channel: &'static str,
    pending: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> ResultSlot<T> {
    /// Create a free slot for the named channel
    pub fn new(channel: &'static str) -> Self {
        Self {
            channel,
            pending: Mutex::new(None),
        }
    }

    /// Transition free -> busy and return the receiver the owner awaits.
    ///
    /// A `begin` on a busy slot is the reentrant-launch protocol violation:
    /// it is logged, the new request is rejected, and the pending request
    /// keeps the slot. Overwriting the pending sender would orphan the
    /// original owner forever.
    pub fn begin(&self) -> GrantResult<oneshot::Receiver<T>> {
        let mut pending = self.pending.lock();
        if pending.is_some() {
            error!(
                channel = self.channel,
                "launch rejected, channel already has a pending request"
            );
            return Err(GrantError::ChannelBusy {
                channel: self.channel,
            });
        }
        let (tx, rx) = oneshot::channel();
        *pending = Some(tx);
        Ok(rx)
    }

    /// Transition busy -> free, delivering `value` to the owner.
    ///
    /// Delivery on a free slot is discarded: a duplicate or late callback
    /// from the interaction layer, not an application fault. Delivery to a
    /// torn-down owner (dropped receiver) is a no-op.
    pub fn complete(&self, value: T) {
        let sender = self.pending.lock().take();
        match sender {
            Some(tx) => {
                if tx.send(value).is_err() {
                    debug!(channel = self.channel, "owner torn down, result dropped");
                }
            }
            None => {
                debug!(channel = self.channel, "stale result discarded");
            }
        }
    }

    /// Whether a request is currently pending on this slot
    pub fn is_busy(&self) -> bool {
        self.pending.lock().is_some()
    }
}

/// Owns the two single-slot channels and dispatches OS interactions.
///
/// `request_grants` and `start_sub_task` register a continuation and return
/// immediately; the interaction runs on a detached task and delivers its
/// result through the slot exactly once. State is scoped to the broker
/// instance, so multiple coordinators coexist safely.
pub struct ResultBroker {
    launcher: SharedPromptLauncher,
    grants: Arc<ResultSlot<PromptResponse>>,
    sub_tasks: Arc<ResultSlot<SubTaskResult>>,
}

impl ResultBroker {
    /// Create a broker dispatching through `launcher`
    pub fn new(launcher: SharedPromptLauncher) -> Self {
        Self {
            launcher,
            grants: Arc::new(ResultSlot::new(CHANNEL_GRANTS)),
            sub_tasks: Arc::new(ResultSlot::new(CHANNEL_SUB_TASK)),
        }
    }

    /// Launch the OS capability prompt for `capabilities`.
    ///
    /// Returns the receiver for the prompt's single result, or
    /// [`GrantError::ChannelBusy`] if a prompt is already in flight.
    pub fn request_grants(
        &self,
        capabilities: Vec<CapabilityId>,
    ) -> GrantResult<oneshot::Receiver<PromptResponse>> {
        let rx = self.grants.begin()?;
        debug!(count = capabilities.len(), "launching capability prompt");
        let launcher = Arc::clone(&self.launcher);
        let slot = Arc::clone(&self.grants);
        tokio::spawn(async move {
            let response = launcher.launch_capability_prompt(capabilities).await;
            slot.complete(response);
        });
        Ok(rx)
    }

    /// Launch a secondary task on the sub-task channel.
    ///
    /// Independent of the grants channel; both may be busy at once.
    pub fn start_sub_task(
        &self,
        intent: SubTaskIntent,
    ) -> GrantResult<oneshot::Receiver<SubTaskResult>> {
        let rx = self.sub_tasks.begin()?;
        debug!(action = intent.action(), "launching sub-task");
        let launcher = Arc::clone(&self.launcher);
        let slot = Arc::clone(&self.sub_tasks);
        tokio::spawn(async move {
            let result = launcher.launch_sub_task(intent).await;
            slot.complete(result);
        });
        Ok(rx)
    }

    /// Whether a capability prompt is in flight
    pub fn grants_busy(&self) -> bool {
        self.grants.is_busy()
    }

    /// Whether a sub-task is in flight
    pub fn sub_task_busy(&self) -> bool {
        self.sub_tasks.is_busy()
    }
}
