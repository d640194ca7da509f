//! Dialog presentation seam

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{DialogChoice, RationalePrompt};

/// Renders the coordinator's dialog decisions and reports the user's choice.
///
/// The coordinator decides *which* dialog variant to show; implementations
/// own the rendering, e.g. a terminal prompt or a GUI dialog. Each call is
/// an independent asynchronous boundary with a single outstanding
/// continuation.
#[async_trait]
pub trait DialogPresenter: Send + Sync {
    /// Show the rationale for a refused request.
    ///
    /// Confirmed re-requests the capabilities; Cancelled denies.
    async fn present_rationale(&self, prompt: &RationalePrompt) -> DialogChoice;

    /// Ask whether to open the settings surface.
    ///
    /// Confirmed opens settings; Cancelled denies.
    async fn present_settings_redirect(&self, prompt: &RationalePrompt) -> DialogChoice;
}

/// Shared dialog presenter type
pub type SharedDialogPresenter = Arc<dyn DialogPresenter>;
