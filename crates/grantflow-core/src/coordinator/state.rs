//! Flow states and the refusal routing decision

use crate::types::{CapabilityId, CapabilityStatus, Outcome};

/// One refused capability with its post-prompt classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    /// The refused capability
    pub capability: CapabilityId,
    /// `Denied` while a rationale may still be shown, `DeniedPermanently`
    /// once the user suppressed future prompts
    pub status: CapabilityStatus,
}

impl Refusal {
    pub(crate) fn new(capability: CapabilityId, status: CapabilityStatus) -> Self {
        Self { capability, status }
    }

    pub(crate) fn is_permanent(&self) -> bool {
        self.status == CapabilityStatus::DeniedPermanently
    }
}

/// States of the permission flow.
///
/// The driving loop performs one state's effect per iteration and moves on;
/// `Done` is the only state with no successor. `round` counts completed
/// prompt rounds and bounds the rationale retry loop.
#[derive(Debug)]
pub(crate) enum FlowState {
    CheckingStatus,
    RequestingCapabilities { round: u32 },
    EvaluatingRefusals { refusals: Vec<Refusal>, round: u32 },
    PresentingRationale { refusals: Vec<Refusal>, round: u32 },
    PresentingSettingsRedirect { refusals: Vec<Refusal> },
    ResumedCheckingStatus { refusals: Vec<Refusal> },
    Done(Outcome),
}

/// Route chosen for a set of post-prompt refusals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefusalRoute {
    /// No refusals remain
    AllGranted,
    /// No rationale to show; terminate silently
    DenySilently,
    /// Some refusal is still eligible for a rationale
    ShowRationale,
    /// The rationale round budget is spent; stop re-prompting
    RationaleExhausted,
    /// Every refusal is permanent; settings redirection is the only path
    RedirectToSettings,
}

/// Pure routing decision for the post-prompt evaluation step.
///
/// `rationale` must already be normalized to `None` when empty, and
/// `rationale_rounds_left` is how many rationale re-request rounds remain.
pub(crate) fn route_refusals(
    refusals: &[Refusal],
    rationale: Option<&str>,
    rationale_rounds_left: u32,
) -> RefusalRoute {
    if refusals.is_empty() {
        return RefusalRoute::AllGranted;
    }
    if rationale.is_none() {
        return RefusalRoute::DenySilently;
    }
    if refusals.iter().all(Refusal::is_permanent) {
        return RefusalRoute::RedirectToSettings;
    }
    if rationale_rounds_left == 0 {
        return RefusalRoute::RationaleExhausted;
    }
    RefusalRoute::ShowRationale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denied(capability: &str) -> Refusal {
        Refusal::new(capability.into(), CapabilityStatus::Denied)
    }

    fn denied_permanently(capability: &str) -> Refusal {
        Refusal::new(capability.into(), CapabilityStatus::DeniedPermanently)
    }

    #[test]
    fn test_no_refusals_is_all_granted() {
        assert_eq!(
            route_refusals(&[], Some("need camera"), 3),
            RefusalRoute::AllGranted
        );
    }

    #[test]
    fn test_missing_rationale_denies_silently() {
        assert_eq!(
            route_refusals(&[denied("camera")], None, 3),
            RefusalRoute::DenySilently
        );
    }

    #[test]
    fn test_eligible_refusal_shows_rationale() {
        let refusals = [denied("camera"), denied_permanently("microphone")];
        assert_eq!(
            route_refusals(&refusals, Some("need both"), 3),
            RefusalRoute::ShowRationale
        );
    }

    #[test]
    fn test_all_permanent_redirects_to_settings() {
        let refusals = [denied_permanently("camera"), denied_permanently("microphone")];
        assert_eq!(
            route_refusals(&refusals, Some("need both"), 3),
            RefusalRoute::RedirectToSettings
        );
    }

    #[test]
    fn test_exhausted_rounds_stop_the_loop() {
        assert_eq!(
            route_refusals(&[denied("camera")], Some("need camera"), 0),
            RefusalRoute::RationaleExhausted
        );
    }

    #[test]
    fn test_settings_redirect_wins_over_exhaustion() {
        // Permanent refusals route to settings even with no rounds left;
        // the settings dialog is not part of the rationale budget.
        assert_eq!(
            route_refusals(&[denied_permanently("camera")], Some("need camera"), 0),
            RefusalRoute::RedirectToSettings
        );
    }
}
