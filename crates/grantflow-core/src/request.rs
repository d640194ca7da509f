//! Permission request submitted to the coordinator

use std::fmt;

use crate::types::{CapabilityId, Outcome};

/// Callback invoked once when every requested capability is granted
pub type GrantedCallback = Box<dyn FnOnce() + Send>;

/// Callback invoked once on a terminal denial
pub type DeniedCallback = Box<dyn FnOnce(DenialContext) + Send>;

/// Context handed to the denial callback
#[derive(Debug, Clone)]
pub struct DenialContext {
    /// Terminal outcome the flow ended in
    pub outcome: Outcome,
    /// Capabilities still refused at the end of the flow
    pub refused: Vec<CapabilityId>,
    /// Subset of `refused` the platform will no longer prompt for
    pub permanently_refused: Vec<CapabilityId>,
}

/// One atomic request for a set of capabilities.
///
/// Immutable once submitted; the coordinator consumes it, loops it through
/// zero or more dialog interactions, and discards it at a terminal
/// [`Outcome`]. Results are delivered through the embedded callbacks.
pub struct PermissionRequest {
    pub(crate) capabilities: Vec<CapabilityId>,
    pub(crate) rationale: Option<String>,
    pub(crate) auto_request: bool,
    pub(crate) on_granted: Option<GrantedCallback>,
    pub(crate) on_denied: Option<DeniedCallback>,
}

impl PermissionRequest {
    /// Create a request for `capabilities`, deduplicated, auto-requesting
    /// by default.
    pub fn new<I, C>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CapabilityId>,
    {
        let mut deduped: Vec<CapabilityId> = Vec::new();
        for capability in capabilities {
            let capability = capability.into();
            if !deduped.contains(&capability) {
                deduped.push(capability);
            }
        }
        Self {
            capabilities: deduped,
            rationale: None,
            auto_request: true,
            on_granted: None,
            on_denied: None,
        }
    }

    /// Attach the explanation shown when the user refuses.
    ///
    /// Empty text is treated as no rationale: refusals then terminate
    /// without any dialog.
    pub fn with_rationale(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.rationale = if text.is_empty() { None } else { Some(text) };
        self
    }

    /// Control whether ungranted capabilities are prompted for automatically
    pub fn with_auto_request(mut self, auto_request: bool) -> Self {
        self.auto_request = auto_request;
        self
    }

    /// Set the callback fired when every capability is granted
    pub fn on_granted(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_granted = Some(Box::new(callback));
        self
    }

    /// Set the callback fired on a terminal denial.
    ///
    /// Without one, the coordinator emits a visible denial notice through
    /// the logging layer.
    pub fn on_denied(mut self, callback: impl FnOnce(DenialContext) + Send + 'static) -> Self {
        self.on_denied = Some(Box::new(callback));
        self
    }

    /// The requested capability set
    pub fn capabilities(&self) -> &[CapabilityId] {
        &self.capabilities
    }

    /// The rationale text, if any
    pub fn rationale(&self) -> Option<&str> {
        self.rationale.as_deref()
    }

    /// Whether ungranted capabilities are prompted for automatically
    pub fn auto_request(&self) -> bool {
        self.auto_request
    }
}

impl fmt::Debug for PermissionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionRequest")
            .field("capabilities", &self.capabilities)
            .field("rationale", &self.rationale)
            .field("auto_request", &self.auto_request)
            .field("on_granted", &self.on_granted.is_some())
            .field("on_denied", &self.on_denied.is_some())
            .finish()
    }
}
