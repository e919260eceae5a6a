//! Profile data model and per-field validation.
//!
//! Field names and enum string literals are part of the wire contract with
//! the remote record store and must round-trip unchanged: struct fields are
//! camelCase, enum values snake_case.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{
    AGE_MAX, AGE_MIN, HEIGHT_MAX, HEIGHT_MIN, MIN_PASSWORD_LEN, WEIGHT_MAX, WEIGHT_MIN,
};
use crate::error::ValidationError;

/// Gender used by the BMR formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Default for Gender {
    fn default() -> Self {
        Self::Male
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// The user's dietary goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    Maintain,
    GainMuscle,
}

impl Default for Goal {
    fn default() -> Self {
        Self::LoseWeight
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::LoseWeight => "lose_weight",
            Self::Maintain => "maintain",
            Self::GainMuscle => "gain_muscle",
        };
        write!(f, "{s}")
    }
}

/// Weekly activity level, scales BMR into TDEE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
}

impl Default for ActivityLevel {
    fn default() -> Self {
        Self::Sedentary
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sedentary => "sedentary",
            Self::LightlyActive => "lightly_active",
            Self::ModeratelyActive => "moderately_active",
            Self::VeryActive => "very_active",
        };
        write!(f, "{s}")
    }
}

/// The persisted user profile.
///
/// The remote copy is authoritative; the local cache slot is a best-effort
/// mirror replaced wholesale on every successful remote read or write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Opaque identity assigned by the authentication gateway.
    pub id: String,
    pub email: String,
    pub age: i32,
    /// Centimeters.
    pub height: i32,
    /// Kilograms.
    pub weight: f64,
    pub gender: Gender,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    pub onboarding_completed: bool,
}

impl Profile {
    /// The all-default profile created immediately after registration.
    /// Numeric fields sit at zero until the onboarding wizard commits.
    pub fn new_registered(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            age: 0,
            height: 0,
            weight: 0.0,
            gender: Gender::default(),
            goal: Goal::default(),
            activity_level: ActivityLevel::default(),
            onboarding_completed: false,
        }
    }

    /// Whether all numeric fields are positive — the guard for deriving
    /// health metrics. Defaulted profiles fail this and must not produce
    /// metrics (a zero height would yield a BMI of infinity).
    pub fn has_complete_measurements(&self) -> bool {
        self.weight > 0.0 && self.height > 0 && self.age > 0
    }

    /// Apply a partial edit. Only the five editable fields change;
    /// `id`, `email`, and `onboardingCompleted` are untouched.
    pub fn with_update(&self, update: &ProfileUpdate) -> Self {
        Self {
            age: update.age,
            height: update.height,
            weight: update.weight,
            goal: update.goal,
            activity_level: update.activity_level,
            ..self.clone()
        }
    }
}

/// The partial record merged into the remote copy on profile edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub age: i32,
    pub height: i32,
    pub weight: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
}

impl ProfileUpdate {
    /// Extract the editable fields from a full profile.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            age: profile.age,
            height: profile.height,
            weight: profile.weight,
            goal: profile.goal,
            activity_level: profile.activity_level,
        }
    }
}

// ── Field validation ────────────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

pub fn validate_age(value: i32) -> Result<(), ValidationError> {
    if (AGE_MIN..=AGE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::AgeOutOfRange {
            value,
            min: AGE_MIN,
            max: AGE_MAX,
        })
    }
}

pub fn validate_height(value: i32) -> Result<(), ValidationError> {
    if (HEIGHT_MIN..=HEIGHT_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::HeightOutOfRange {
            value,
            min: HEIGHT_MIN,
            max: HEIGHT_MAX,
        })
    }
}

pub fn validate_weight(value: f64) -> Result<(), ValidationError> {
    if (WEIGHT_MIN..=WEIGHT_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::WeightOutOfRange {
            value,
            min: WEIGHT_MIN,
            max: WEIGHT_MAX,
        })
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail {
            email: email.to_string(),
        })
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_profile_has_defaults() {
        let p = Profile::new_registered("uid-1", "a@example.com");
        assert_eq!(p.id, "uid-1");
        assert_eq!(p.email, "a@example.com");
        assert_eq!(p.age, 0);
        assert_eq!(p.height, 0);
        assert_eq!(p.weight, 0.0);
        assert_eq!(p.goal, Goal::LoseWeight);
        assert_eq!(p.activity_level, ActivityLevel::Sedentary);
        assert!(!p.onboarding_completed);
        assert!(!p.has_complete_measurements());
    }

    #[test]
    fn wire_contract_field_names_round_trip() {
        let p = Profile {
            id: "uid-1".to_string(),
            email: "a@example.com".to_string(),
            age: 30,
            height: 175,
            weight: 70.0,
            gender: Gender::Female,
            goal: Goal::GainMuscle,
            activity_level: ActivityLevel::ModeratelyActive,
            onboarding_completed: true,
        };

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["activityLevel"], "moderately_active");
        assert_eq!(json["onboardingCompleted"], true);
        assert_eq!(json["gender"], "female");
        assert_eq!(json["goal"], "gain_muscle");

        let parsed: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, p);
    }

    #[test]
    fn display_matches_serde() {
        for goal in [Goal::LoseWeight, Goal::Maintain, Goal::GainMuscle] {
            let json = serde_json::to_string(&goal).unwrap();
            assert_eq!(format!("\"{goal}\""), json);
        }
        for level in [
            ActivityLevel::Sedentary,
            ActivityLevel::LightlyActive,
            ActivityLevel::ModeratelyActive,
            ActivityLevel::VeryActive,
        ] {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(format!("\"{level}\""), json);
        }
        for gender in [Gender::Male, Gender::Female] {
            let json = serde_json::to_string(&gender).unwrap();
            assert_eq!(format!("\"{gender}\""), json);
        }
    }

    #[test]
    fn unknown_enum_literal_is_rejected() {
        let err = serde_json::from_str::<ActivityLevel>("\"extremely_active\"");
        assert!(err.is_err());
    }

    #[test]
    fn update_leaves_identity_fields_untouched() {
        let base = Profile::new_registered("uid-1", "a@example.com");
        let update = ProfileUpdate {
            age: 28,
            height: 180,
            weight: 82.5,
            goal: Goal::Maintain,
            activity_level: ActivityLevel::VeryActive,
        };
        let edited = base.with_update(&update);
        assert_eq!(edited.id, "uid-1");
        assert_eq!(edited.email, "a@example.com");
        assert!(!edited.onboarding_completed);
        assert_eq!(edited.age, 28);
        assert_eq!(edited.weight, 82.5);
        assert_eq!(edited.activity_level, ActivityLevel::VeryActive);
    }

    #[test]
    fn measurement_guard_requires_all_positive() {
        let mut p = Profile::new_registered("uid-1", "a@example.com");
        p.age = 30;
        p.height = 175;
        assert!(!p.has_complete_measurements());
        p.weight = 70.0;
        assert!(p.has_complete_measurements());
        p.age = 0;
        assert!(!p.has_complete_measurements());
    }

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(validate_age(15).is_ok());
        assert!(validate_age(100).is_ok());
        assert!(validate_age(14).is_err());
        assert!(validate_age(101).is_err());
    }

    #[test]
    fn height_and_weight_bounds() {
        assert!(validate_height(100).is_ok());
        assert!(validate_height(250).is_ok());
        assert!(validate_height(99).is_err());
        assert!(validate_weight(30.0).is_ok());
        assert!(validate_weight(300.0).is_ok());
        assert!(validate_weight(29.9).is_err());
        assert!(validate_weight(300.1).is_err());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
    }
}
