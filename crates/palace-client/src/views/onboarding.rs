use tracing::info;

use super::{Route, ViewError, gateway_failure, require_token, resolve_onboarding_route};
use crate::gateway::BackendGateway;
use crate::onboarding::{OnboardingWizard, PillarCategory, WizardAdvance};
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnboardingStep {
    Unchanged,
    Advanced(PillarCategory),
    Completed(Route),
}

/// `/onboarding`. Holds the wizard; `&mut self` keeps submission single-flight.
pub struct OnboardingController {
    session: SessionContext,
    gateway: BackendGateway,
    wizard: OnboardingWizard,
}

impl OnboardingController {
    pub fn new(session: SessionContext, gateway: BackendGateway) -> Self {
        Self {
            session,
            gateway,
            wizard: OnboardingWizard::new(),
        }
    }

    pub fn wizard(&self) -> &OnboardingWizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut OnboardingWizard {
        &mut self.wizard
    }

    /// Where the visitor should be: here, the dashboard, or sign-in.
    pub async fn enter(&self) -> Route {
        resolve_onboarding_route(&self.session, &self.gateway).await
    }

    pub async fn continue_step(&mut self) -> Result<OnboardingStep, ViewError> {
        let payload = match self.wizard.continue_step() {
            WizardAdvance::Unchanged => return Ok(OnboardingStep::Unchanged),
            WizardAdvance::Advanced(step) => return Ok(OnboardingStep::Advanced(step)),
            WizardAdvance::ReadyToSubmit(payload) => payload,
        };

        let token = require_token(&self.session)?;
        let saved = self
            .gateway
            .submit_onboarding(&token, &payload)
            .await
            .map_err(|err| gateway_failure(&self.session, err))?;
        info!(
            "onboarding submitted ({} pillars, backend stored {})",
            payload.total(),
            saved.count
        );

        Ok(OnboardingStep::Completed(Route::Dashboard))
    }
}
