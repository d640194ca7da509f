//! Permission-rationale coordination state machine
//!
//! [`PermissionCoordinator`] runs the decision tree around repeated or
//! denied capability requests: proceed silently, re-prompt with an
//! explanation, or redirect the user to the settings surface. OS prompts go
//! through the broker's single-slot channels; dialogs go through the
//! presenter seam.

mod state;

pub use state::Refusal;

use tracing::{debug, info, warn};

use crate::broker::{ResultBroker, CHANNEL_GRANTS};
use crate::config::{CoordinatorConfig, DEFAULT_MAX_RATIONALE_ROUNDS};
use crate::dialog::SharedDialogPresenter;
use crate::error::{GrantError, GrantResult};
use crate::launcher::SharedPromptLauncher;
use crate::oracle::SharedCapabilityOracle;
use crate::request::{DenialContext, PermissionRequest};
use crate::types::{
    CapabilityId, CapabilityStatus, Outcome, PromptResponse, RationalePrompt, SubTaskIntent,
};

use state::{route_refusals, FlowState, RefusalRoute};

/// Coordinates capability requests against the platform's dialog-driven
/// authorization surface.
///
/// One request is driven at a time per instance; a submission while a
/// channel is still busy is rejected, never queued. Every accepted
/// submission reaches a terminal [`Outcome`].
pub struct PermissionCoordinator {
    oracle: SharedCapabilityOracle,
    dialogs: SharedDialogPresenter,
    broker: ResultBroker,
    max_rationale_rounds: u32,
}

impl PermissionCoordinator {
    /// Create a coordinator over the given collaborators
    pub fn new(
        oracle: SharedCapabilityOracle,
        launcher: SharedPromptLauncher,
        dialogs: SharedDialogPresenter,
    ) -> Self {
        Self {
            oracle,
            dialogs,
            broker: ResultBroker::new(launcher),
            max_rationale_rounds: DEFAULT_MAX_RATIONALE_ROUNDS,
        }
    }

    /// Apply a configuration
    pub fn with_config(mut self, config: &CoordinatorConfig) -> Self {
        self.max_rationale_rounds = config.max_rationale_rounds;
        self
    }

    /// Override the rationale re-request round budget
    pub fn with_max_rationale_rounds(mut self, rounds: u32) -> Self {
        self.max_rationale_rounds = rounds;
        self
    }

    /// Run the permission flow for `request`.
    ///
    /// The terminal outcome is returned and also delivered through the
    /// request's callbacks. The only error is the reentrancy rejection:
    /// submitting while this coordinator still has an interaction in
    /// flight. A rejected submission fires no callbacks; the caller retries
    /// after the in-flight request resolves.
    pub async fn request_capabilities(&self, request: PermissionRequest) -> GrantResult<Outcome> {
        let PermissionRequest {
            capabilities,
            rationale,
            auto_request,
            on_granted,
            on_denied,
        } = request;

        debug!(
            capabilities = ?capabilities,
            auto_request,
            "capability request submitted"
        );

        let (outcome, refusals) = self
            .drive(&capabilities, rationale.as_deref(), auto_request)
            .await?;

        info!(%outcome, "capability request finished");

        match outcome {
            Outcome::AllGranted => {
                if let Some(callback) = on_granted {
                    callback();
                }
            }
            _ => {
                let context = DenialContext {
                    outcome,
                    refused: refusals.iter().map(|r| r.capability.clone()).collect(),
                    permanently_refused: refusals
                        .iter()
                        .filter(|r| r.is_permanent())
                        .map(|r| r.capability.clone())
                        .collect(),
                };
                match on_denied {
                    Some(callback) => callback(context),
                    // Default denial notice when the caller supplies no
                    // override.
                    None => warn!(
                        %outcome,
                        refused = ?context.refused,
                        "capability request denied"
                    ),
                }
            }
        }

        Ok(outcome)
    }

    /// Run the state machine to a terminal outcome.
    ///
    /// Returns the outcome together with the refusals still standing when
    /// the flow ended, for the denial context.
    async fn drive(
        &self,
        capabilities: &[CapabilityId],
        rationale: Option<&str>,
        auto_request: bool,
    ) -> GrantResult<(Outcome, Vec<Refusal>)> {
        let mut last_refusals: Vec<Refusal> = Vec::new();
        let mut state = FlowState::CheckingStatus;

        loop {
            state = match state {
                FlowState::CheckingStatus => {
                    let ungranted = self.ungranted(capabilities);
                    if ungranted.is_empty() {
                        // Idempotent short-circuit: no prompt is launched.
                        FlowState::Done(Outcome::AllGranted)
                    } else if auto_request {
                        FlowState::RequestingCapabilities { round: 0 }
                    } else {
                        debug!("caller opted out of auto-request, denying without prompt");
                        last_refusals = ungranted
                            .into_iter()
                            .map(|c| Refusal::new(c, CapabilityStatus::Denied))
                            .collect();
                        FlowState::Done(Outcome::DeniedWithoutPrompt)
                    }
                }

                FlowState::RequestingCapabilities { round } => {
                    // Re-check on every round: a rationale confirm may come
                    // after the user granted from elsewhere.
                    let ungranted = self.ungranted(capabilities);
                    if ungranted.is_empty() {
                        FlowState::Done(Outcome::AllGranted)
                    } else {
                        let rx = self.broker.request_grants(ungranted.clone())?;
                        let response = match rx.await {
                            Ok(response) => response,
                            Err(_) => {
                                let error = GrantError::ChannelClosed {
                                    channel: CHANNEL_GRANTS,
                                };
                                warn!(%error, "treating prompted capabilities as refused");
                                PromptResponse::new()
                            }
                        };
                        let refusals = self.classify_refusals(&ungranted, &response);
                        FlowState::EvaluatingRefusals { refusals, round }
                    }
                }

                FlowState::EvaluatingRefusals { refusals, round } => {
                    let rounds_left = self.max_rationale_rounds.saturating_sub(round);
                    match route_refusals(&refusals, rationale, rounds_left) {
                        RefusalRoute::AllGranted => FlowState::Done(Outcome::AllGranted),
                        RefusalRoute::DenySilently => {
                            last_refusals = refusals;
                            FlowState::Done(Outcome::DeniedWithoutPrompt)
                        }
                        RefusalRoute::RationaleExhausted => {
                            info!(
                                rounds = self.max_rationale_rounds,
                                "rationale round budget spent, denying"
                            );
                            last_refusals = refusals;
                            FlowState::Done(Outcome::DeniedAfterPrompt)
                        }
                        RefusalRoute::ShowRationale => {
                            FlowState::PresentingRationale { refusals, round }
                        }
                        RefusalRoute::RedirectToSettings => {
                            FlowState::PresentingSettingsRedirect { refusals }
                        }
                    }
                }

                FlowState::PresentingRationale { refusals, round } => {
                    let prompt = self.rationale_prompt(rationale, &refusals);
                    if self.dialogs.present_rationale(&prompt).await.is_confirmed() {
                        FlowState::RequestingCapabilities { round: round + 1 }
                    } else {
                        last_refusals = refusals;
                        FlowState::Done(Outcome::DeniedAfterPrompt)
                    }
                }

                FlowState::PresentingSettingsRedirect { refusals } => {
                    let prompt = self.rationale_prompt(rationale, &refusals);
                    if self
                        .dialogs
                        .present_settings_redirect(&prompt)
                        .await
                        .is_confirmed()
                    {
                        let rx = self.broker.start_sub_task(SubTaskIntent::app_settings())?;
                        // Only that control returned matters; an abnormal
                        // return still re-checks.
                        if rx.await.is_err() {
                            warn!("settings sub-task died before returning");
                        }
                        FlowState::ResumedCheckingStatus { refusals }
                    } else {
                        last_refusals = refusals;
                        FlowState::Done(Outcome::DeniedAfterPrompt)
                    }
                }

                FlowState::ResumedCheckingStatus { refusals } => {
                    if self.ungranted(capabilities).is_empty() {
                        FlowState::Done(Outcome::AllGranted)
                    } else {
                        last_refusals = refusals;
                        FlowState::Done(Outcome::RedirectedToSettings)
                    }
                }

                FlowState::Done(outcome) => return Ok((outcome, last_refusals)),
            };
        }
    }

    /// Requested capabilities the oracle does not report granted.
    ///
    /// A failed query counts as not granted, never as fatal.
    fn ungranted(&self, capabilities: &[CapabilityId]) -> Vec<CapabilityId> {
        capabilities
            .iter()
            .filter(|capability| {
                !self
                    .oracle
                    .is_granted(capability)
                    .unwrap_or_else(|error| {
                        warn!(
                            capability = %capability,
                            %error,
                            "status query failed, treating as not granted"
                        );
                        false
                    })
            })
            .cloned()
            .collect()
    }

    /// Classify each refused capability from the prompted set.
    ///
    /// A failed rationale query counts as rationale-suppressed, the route
    /// that never re-prompts.
    fn classify_refusals(
        &self,
        prompted: &[CapabilityId],
        response: &PromptResponse,
    ) -> Vec<Refusal> {
        prompted
            .iter()
            .filter(|capability| !response.is_granted(capability))
            .map(|capability| {
                let rationale_eligible = self
                    .oracle
                    .should_show_rationale(capability)
                    .unwrap_or_else(|error| {
                        warn!(
                            capability = %capability,
                            %error,
                            "rationale query failed, treating as suppressed"
                        );
                        false
                    });
                let status = if rationale_eligible {
                    CapabilityStatus::Denied
                } else {
                    CapabilityStatus::DeniedPermanently
                };
                Refusal::new(capability.clone(), status)
            })
            .collect()
    }

    fn rationale_prompt(&self, rationale: Option<&str>, refusals: &[Refusal]) -> RationalePrompt {
        RationalePrompt {
            text: rationale.unwrap_or_default().to_string(),
            capabilities: refusals.iter().map(|r| r.capability.clone()).collect(),
        }
    }
}
