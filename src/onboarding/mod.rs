//! Onboarding system — the first-launch data-collection wizard.
//!
//! A fixed-order, step-validated flow that accumulates profile fields in
//! a draft and commits them atomically through the controller at the
//! final step.

pub mod state;
pub mod wizard;

pub use state::{OnboardingDraft, OnboardingStep};
pub use wizard::{OnboardingWizard, StepInput, WizardAdvance};
