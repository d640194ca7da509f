//! Permission flow integration test
//!
//! Drives the coordinator end to end through the public API, with the
//! platform seams stubbed the way an embedding application would stub them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use grantflow_core::{
    CapabilityId, CapabilityOracle, DialogChoice, DialogPresenter, GrantResult, Outcome,
    PermissionCoordinator, PermissionRequest, PromptLauncher, PromptResponse, RationalePrompt,
    SubTaskIntent, SubTaskResult,
};

/// Platform stub: grant state flips when the user "visits settings" or
/// accepts the second prompt.
struct ScriptedPlatform {
    granted: Mutex<HashSet<CapabilityId>>,
    rationale_eligible: Mutex<HashSet<CapabilityId>>,
    /// Prompt answers to play back, oldest first; `true` grants everything
    /// in that round.
    prompt_script: Mutex<Vec<bool>>,
    prompts_shown: AtomicUsize,
}

impl ScriptedPlatform {
    fn new(prompt_script: Vec<bool>) -> Self {
        Self {
            granted: Mutex::new(HashSet::new()),
            rationale_eligible: Mutex::new(HashSet::new()),
            prompt_script: Mutex::new(prompt_script),
            prompts_shown: AtomicUsize::new(0),
        }
    }
}

impl CapabilityOracle for ScriptedPlatform {
    fn is_granted(&self, capability: &CapabilityId) -> GrantResult<bool> {
        Ok(self.granted.lock().contains(capability))
    }

    fn should_show_rationale(&self, capability: &CapabilityId) -> GrantResult<bool> {
        Ok(self.rationale_eligible.lock().contains(capability))
    }
}

#[async_trait]
impl PromptLauncher for ScriptedPlatform {
    async fn launch_capability_prompt(&self, capabilities: Vec<CapabilityId>) -> PromptResponse {
        self.prompts_shown.fetch_add(1, Ordering::SeqCst);
        let grant = {
            let mut script = self.prompt_script.lock();
            if script.is_empty() { false } else { script.remove(0) }
        };
        if grant {
            let mut granted = self.granted.lock();
            for capability in &capabilities {
                granted.insert(capability.clone());
            }
        }
        capabilities.into_iter().map(|c| (c, grant)).collect()
    }

    async fn launch_sub_task(&self, _intent: SubTaskIntent) -> SubTaskResult {
        SubTaskResult::Completed
    }
}

struct ConfirmingDialogs;

#[async_trait]
impl DialogPresenter for ConfirmingDialogs {
    async fn present_rationale(&self, _prompt: &RationalePrompt) -> DialogChoice {
        DialogChoice::Confirmed
    }

    async fn present_settings_redirect(&self, _prompt: &RationalePrompt) -> DialogChoice {
        DialogChoice::Confirmed
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("grantflow_core=debug")
        .try_init();
}

#[tokio::test]
async fn test_refusal_then_rationale_then_grant() {
    init_tracing();

    // First prompt refused, second (after the rationale) granted.
    let platform = Arc::new(ScriptedPlatform::new(vec![false, true]));
    platform.rationale_eligible.lock().insert("camera".into());

    let coordinator = PermissionCoordinator::new(
        platform.clone(),
        platform.clone(),
        Arc::new(ConfirmingDialogs),
    );

    let outcome = coordinator
        .request_capabilities(
            PermissionRequest::new(["camera"]).with_rationale("scanning needs the camera"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::AllGranted);
    assert_eq!(platform.prompts_shown.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_permanent_refusal_resolves_through_settings() {
    init_tracing();

    // Every prompt refused and no rationale eligibility: the only path is
    // the settings surface, where nothing changes either.
    let platform = Arc::new(ScriptedPlatform::new(vec![false]));

    let coordinator = PermissionCoordinator::new(
        platform.clone(),
        platform.clone(),
        Arc::new(ConfirmingDialogs),
    );

    let outcome = coordinator
        .request_capabilities(
            PermissionRequest::new(["camera"]).with_rationale("scanning needs the camera"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::RedirectedToSettings);
}
