//! Shared data types for the capability request flow

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque identifier of one authorizable capability gated by the host
/// platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilityId(String);

impl CapabilityId {
    /// Create a new capability id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CapabilityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CapabilityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Status of a capability after a prompt round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityStatus {
    /// Granted by the user
    Granted,
    /// Refused, but the platform still allows showing a rationale
    Denied,
    /// Refused and the platform will no longer prompt for it; settings
    /// redirection is the only remaining path
    DeniedPermanently,
}

impl CapabilityStatus {
    /// Check if the capability is granted
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Check if the capability was refused in any form
    pub fn is_refused(&self) -> bool {
        !self.is_granted()
    }
}

/// Terminal outcome of a permission flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every requested capability is granted
    AllGranted,
    /// Refused without showing any dialog
    DeniedWithoutPrompt,
    /// Refused after at least one dialog interaction
    DeniedAfterPrompt,
    /// The user visited the settings surface and still did not grant
    RedirectedToSettings,
}

impl Outcome {
    /// Check if this outcome means every capability was granted
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::AllGranted)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllGranted => write!(f, "all granted"),
            Self::DeniedWithoutPrompt => write!(f, "denied without prompt"),
            Self::DeniedAfterPrompt => write!(f, "denied after prompt"),
            Self::RedirectedToSettings => write!(f, "redirected to settings"),
        }
    }
}

/// Result of one OS capability prompt: which capabilities the user granted
#[derive(Debug, Clone, Default)]
pub struct PromptResponse {
    grants: HashMap<CapabilityId, bool>,
}

impl PromptResponse {
    /// Create an empty response
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the user's answer for one capability
    pub fn record(&mut self, capability: CapabilityId, granted: bool) {
        self.grants.insert(capability, granted);
    }

    /// Whether the user granted `capability` in this round.
    ///
    /// A capability missing from the response counts as refused.
    pub fn is_granted(&self, capability: &CapabilityId) -> bool {
        self.grants.get(capability).copied().unwrap_or(false)
    }

    /// Number of capabilities answered in this round
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Check if the response is empty
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl FromIterator<(CapabilityId, bool)> for PromptResponse {
    fn from_iter<I: IntoIterator<Item = (CapabilityId, bool)>>(iter: I) -> Self {
        Self {
            grants: iter.into_iter().collect(),
        }
    }
}

/// Descriptor for a secondary task launched on the sub-task channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTaskIntent {
    action: String,
    target: Option<String>,
}

impl SubTaskIntent {
    /// Action naming the platform's application settings surface
    pub const ACTION_APP_SETTINGS: &'static str = "app-settings";

    /// Create an intent with an action and no target
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target: None,
        }
    }

    /// Intent that opens the settings surface for the running application
    pub fn app_settings() -> Self {
        Self::new(Self::ACTION_APP_SETTINGS)
    }

    /// Attach a target to the intent
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Get the intent action
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Get the intent target, if any
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// Result of a completed sub-task.
///
/// Settings redirection only cares that control came back; the variant is
/// informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubTaskResult {
    /// The sub-task ran to completion
    Completed,
    /// The sub-task was abandoned before completing
    Cancelled,
}

/// User's choice in a two-exit dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    /// The user accepted the dialog's proposal
    Confirmed,
    /// The user dismissed the dialog
    Cancelled,
}

impl DialogChoice {
    /// Check if the user confirmed
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed)
    }
}

/// Payload handed to the dialog presenter
#[derive(Debug, Clone)]
pub struct RationalePrompt {
    /// Caller-supplied explanation text
    pub text: String,
    /// Capabilities the explanation is about
    pub capabilities: Vec<CapabilityId>,
}
