//! Grantflow Core Library
//!
//! Coordination for dialog-driven authorization surfaces: a single-slot
//! result broker over the platform's asynchronous prompt and sub-task
//! interactions, a permission coordinator running the rationale/retry
//! decision tree on top of it, and the transfer-progress plumbing that
//! rides along with tagged HTTP requests.
//!
//! The platform itself is reached through trait seams: a
//! [`CapabilityOracle`] for point-in-time status, a [`PromptLauncher`] for
//! the OS interactions, and a [`DialogPresenter`] for user-facing dialogs.

pub mod broker;
pub mod config;
pub mod coordinator;
pub mod dialog;
pub mod error;
pub mod launcher;
pub mod oracle;
pub mod request;
pub mod transfer;
pub mod types;

// Re-export commonly used types
pub use broker::{ResultBroker, ResultSlot, CHANNEL_GRANTS, CHANNEL_SUB_TASK};
pub use config::{CoordinatorConfig, HttpConfig, DEFAULT_MAX_RATIONALE_ROUNDS};
pub use coordinator::{PermissionCoordinator, Refusal};
pub use dialog::{DialogPresenter, SharedDialogPresenter};
pub use error::{GrantError, GrantResult};
pub use launcher::{PromptLauncher, SharedPromptLauncher};
pub use oracle::{CapabilityOracle, SharedCapabilityOracle};
pub use request::{DenialContext, PermissionRequest};
pub use transfer::{ListenerRegistry, TransferClient, TransferListener};
pub use types::{
    CapabilityId, CapabilityStatus, DialogChoice, Outcome, PromptResponse, RationalePrompt,
    SubTaskIntent, SubTaskResult,
};
