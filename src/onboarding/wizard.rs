//! The onboarding wizard — stages one value per step, validates on
//! `next()`, and commits the accumulated draft through the controller at
//! the final step.

use tokio::task::JoinHandle;
use tracing::debug;

use crate::controller::ProfileController;
use crate::error::ValidationError;
use crate::profile::{self, ActivityLevel, Goal};

use super::state::{OnboardingDraft, OnboardingStep};

/// A value staged for one wizard step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepInput {
    Age(i32),
    Height(i32),
    Weight(f64),
    Goal(Goal),
    ActivityLevel(ActivityLevel),
}

impl StepInput {
    fn step(&self) -> OnboardingStep {
        match self {
            Self::Age(_) => OnboardingStep::Age,
            Self::Height(_) => OnboardingStep::Height,
            Self::Weight(_) => OnboardingStep::Weight,
            Self::Goal(_) => OnboardingStep::Goal,
            Self::ActivityLevel(_) => OnboardingStep::ActivityLevel,
        }
    }
}

/// Result of a successful `next()`.
#[derive(Debug)]
pub enum WizardAdvance {
    /// Moved on to the given step.
    Step(OnboardingStep),
    /// The draft was committed through the controller; the wizard is
    /// finished. The handle observes the commit action's completion.
    Committed(JoinHandle<()>),
}

/// Fixed-order, step-validated data collection. Values accumulate in the
/// draft and are committed atomically at the last step.
pub struct OnboardingWizard {
    controller: ProfileController,
    step: OnboardingStep,
    draft: OnboardingDraft,
    pending: Option<StepInput>,
    staged: [bool; 5],
    finished: bool,
}

impl OnboardingWizard {
    pub fn new(controller: ProfileController) -> Self {
        Self {
            controller,
            step: OnboardingStep::default(),
            draft: OnboardingDraft::default(),
            pending: None,
            staged: [false; 5],
            finished: false,
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The draft accumulated so far.
    pub fn draft(&self) -> &OnboardingDraft {
        &self.draft
    }

    /// Stage a value for the current step. The value is validated on
    /// `next()`, not here.
    pub fn stage(&mut self, input: StepInput) -> Result<(), ValidationError> {
        if self.finished {
            return Err(ValidationError::AlreadyCommitted);
        }
        if input.step() != self.step {
            return Err(ValidationError::StepMismatch {
                step: self.step.to_string(),
            });
        }
        self.pending = Some(input);
        Ok(())
    }

    /// The value to pre-fill when re-entering a step: whatever was
    /// already accepted into the draft for it, if anything.
    pub fn prefill(&self) -> Option<StepInput> {
        if !self.staged[self.step.index()] {
            return None;
        }
        Some(match self.step {
            OnboardingStep::Age => StepInput::Age(self.draft.age),
            OnboardingStep::Height => StepInput::Height(self.draft.height),
            OnboardingStep::Weight => StepInput::Weight(self.draft.weight),
            OnboardingStep::Goal => StepInput::Goal(self.draft.goal),
            OnboardingStep::ActivityLevel => StepInput::ActivityLevel(self.draft.activity_level),
        })
    }

    /// Validate the staged value, fold it into the draft, and advance.
    ///
    /// On validation failure the step does not change and the draft is
    /// untouched. At the last step the draft is committed through the
    /// controller and the wizard exits; it is inert afterwards.
    pub fn next(&mut self) -> Result<WizardAdvance, ValidationError> {
        if self.finished {
            return Err(ValidationError::AlreadyCommitted);
        }

        // A step already accepted into the draft passes without
        // re-staging, which is what makes back-and-forth editing work.
        let input = match self.pending.take().or_else(|| self.prefill()) {
            Some(input) => input,
            None => {
                return Err(ValidationError::MissingValue {
                    step: self.step.to_string(),
                });
            }
        };

        match input {
            StepInput::Age(value) => {
                if let Err(e) = profile::validate_age(value) {
                    self.pending = Some(input);
                    return Err(e);
                }
                self.draft.age = value;
            }
            StepInput::Height(value) => {
                if let Err(e) = profile::validate_height(value) {
                    self.pending = Some(input);
                    return Err(e);
                }
                self.draft.height = value;
            }
            StepInput::Weight(value) => {
                if let Err(e) = profile::validate_weight(value) {
                    self.pending = Some(input);
                    return Err(e);
                }
                self.draft.weight = value;
            }
            // Selection steps validate presence only, which staging
            // already established.
            StepInput::Goal(value) => self.draft.goal = value,
            StepInput::ActivityLevel(value) => self.draft.activity_level = value,
        }
        self.staged[self.step.index()] = true;

        match self.step.next() {
            Some(next_step) => {
                self.step = next_step;
                Ok(WizardAdvance::Step(next_step))
            }
            None => {
                debug!("Wizard complete, committing draft");
                self.finished = true;
                let handle = self.controller.complete_onboarding(self.draft.clone());
                Ok(WizardAdvance::Committed(handle))
            }
        }
    }

    /// Step back, clamped at the first step. Never validates, never
    /// mutates the draft.
    pub fn previous(&mut self) {
        self.pending = None;
        if let Some(step) = self.step.previous() {
            self.step = step;
        }
    }
}
