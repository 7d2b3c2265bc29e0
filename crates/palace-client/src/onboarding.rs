use crate::models::{OnboardingPillarsRequest, PillarPayload};
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PillarCategory {
    People,
    Interests,
    LifeEvents,
}

impl PillarCategory {
    /// Wizard order.
    pub const STEPS: [Self; 3] = [Self::People, Self::Interests, Self::LifeEvents];

    pub const fn key(self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Interests => "interests",
            Self::LifeEvents => "life_events",
        }
    }

    pub const fn prompt(self) -> &'static str {
        match self {
            Self::People => "Who are the people that matter most to you?",
            Self::Interests => "What do you love spending time on?",
            Self::LifeEvents => "Which moments shaped your life?",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::People => 0,
            Self::Interests => 1,
            Self::LifeEvents => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pillar {
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAdvance {
    /// Continue was not allowed; nothing changed.
    Unchanged,
    Advanced(PillarCategory),
    ReadyToSubmit(OnboardingPillarsRequest),
}

/// Linear people → interests → life events wizard. Local until submitted.
#[derive(Debug, Clone, Default)]
pub struct OnboardingWizard {
    step_index: usize,
    pillars: [Vec<Pillar>; 3],
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> PillarCategory {
        PillarCategory::STEPS[self.step_index]
    }

    pub fn step_number(&self) -> usize {
        self.step_index + 1
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index + 1 == PillarCategory::STEPS.len()
    }

    pub fn pillars(&self, category: PillarCategory) -> &[Pillar] {
        &self.pillars[category.index()]
    }

    pub fn add_pillar(
        &mut self,
        name: &str,
        avatar_url: Option<String>,
    ) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyPillarName);
        }

        let step = &mut self.pillars[self.step_index];
        if step
            .iter()
            .any(|existing| existing.name.eq_ignore_ascii_case(name))
        {
            return Err(ValidationError::DuplicatePillar(name.to_string()));
        }

        step.push(Pillar {
            name: name.to_string(),
            avatar_url: avatar_url.filter(|url| !url.trim().is_empty()),
        });
        Ok(())
    }

    pub fn remove_pillar(&mut self, index: usize) -> Option<Pillar> {
        let step = &mut self.pillars[self.step_index];
        if index < step.len() {
            Some(step.remove(index))
        } else {
            None
        }
    }

    /// Non-final steps need at least one pillar; the final step is always open.
    pub fn can_continue(&self) -> bool {
        self.is_last_step() || !self.pillars[self.step_index].is_empty()
    }

    pub fn continue_step(&mut self) -> WizardAdvance {
        if !self.can_continue() {
            return WizardAdvance::Unchanged;
        }
        if self.is_last_step() {
            return WizardAdvance::ReadyToSubmit(self.submission());
        }

        self.step_index += 1;
        WizardAdvance::Advanced(self.current_step())
    }

    pub fn back(&mut self) -> PillarCategory {
        self.step_index = self.step_index.saturating_sub(1);
        self.current_step()
    }

    pub fn submission(&self) -> OnboardingPillarsRequest {
        let payload = |category: PillarCategory| -> Vec<PillarPayload> {
            self.pillars(category)
                .iter()
                .map(|pillar| PillarPayload {
                    name: pillar.name.clone(),
                    category: category.key().to_string(),
                    avatar_url: pillar.avatar_url.clone(),
                })
                .collect()
        };

        OnboardingPillarsRequest {
            people: payload(PillarCategory::People),
            interests: payload(PillarCategory::Interests),
            life_events: payload(PillarCategory::LifeEvents),
        }
    }
}
