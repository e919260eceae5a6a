//! Onboarding steps and the draft accumulator.

use serde::{Deserialize, Serialize};

use crate::config::steps;
use crate::profile::{ActivityLevel, Gender, Goal, Profile};

/// The five wizard steps, in fixed order.
///
/// Progresses linearly: Age → Height → Weight → Goal → ActivityLevel.
/// Committing is the terminal action at the last step, not a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Age,
    Height,
    Weight,
    Goal,
    ActivityLevel,
}

impl OnboardingStep {
    /// Zero-based step index.
    pub fn index(&self) -> usize {
        match self {
            Self::Age => 0,
            Self::Height => 1,
            Self::Weight => 2,
            Self::Goal => 3,
            Self::ActivityLevel => 4,
        }
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        match self {
            Self::Age => Some(Self::Height),
            Self::Height => Some(Self::Weight),
            Self::Weight => Some(Self::Goal),
            Self::Goal => Some(Self::ActivityLevel),
            Self::ActivityLevel => None,
        }
    }

    /// Get the previous step, if any.
    pub fn previous(&self) -> Option<OnboardingStep> {
        match self {
            Self::Age => None,
            Self::Height => Some(Self::Age),
            Self::Weight => Some(Self::Height),
            Self::Goal => Some(Self::Weight),
            Self::ActivityLevel => Some(Self::Goal),
        }
    }

    /// Whether this is the last step before commit.
    pub fn is_last(&self) -> bool {
        matches!(self, Self::ActivityLevel)
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Age => steps::AGE,
            Self::Height => steps::HEIGHT,
            Self::Weight => steps::WEIGHT,
            Self::Goal => steps::GOAL,
            Self::ActivityLevel => steps::ACTIVITY_LEVEL,
        };
        write!(f, "{s}")
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Age
    }
}

/// The values collected so far. Transient — created when the wizard
/// starts, discarded on commit or abandonment, never partially persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingDraft {
    pub age: i32,
    pub height: i32,
    pub weight: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
}

impl Default for OnboardingDraft {
    fn default() -> Self {
        Self {
            age: 0,
            height: 0,
            weight: 0.0,
            goal: Goal::default(),
            activity_level: ActivityLevel::default(),
        }
    }
}

impl OnboardingDraft {
    /// Assemble the full profile committed at the end of onboarding.
    /// Gender is never collected by the wizard; the committed profile
    /// always carries the fixed default.
    pub fn into_profile(self, id: String, email: String) -> Profile {
        Profile {
            id,
            email,
            age: self.age,
            height: self.height,
            weight: self.weight,
            gender: Gender::default(),
            goal: self.goal,
            activity_level: self.activity_level,
            onboarding_completed: true,
        }
    }
}
