//! Shared constants and binary configuration.

/// Minimum accepted age, inclusive.
pub const AGE_MIN: i32 = 15;
/// Maximum accepted age, inclusive.
pub const AGE_MAX: i32 = 100;

/// Minimum accepted height in centimeters, inclusive.
pub const HEIGHT_MIN: i32 = 100;
/// Maximum accepted height in centimeters, inclusive.
pub const HEIGHT_MAX: i32 = 250;

/// Minimum accepted weight in kilograms, inclusive.
pub const WEIGHT_MIN: f64 = 30.0;
/// Maximum accepted weight in kilograms, inclusive.
pub const WEIGHT_MAX: f64 = 300.0;

/// Minimum password length accepted by client-side validation.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Daily calorie goals are clamped to this floor.
pub const MIN_DAILY_CALORIES: i32 = 1200;

/// Onboarding step identifiers, in wizard order.
pub mod steps {
    pub const AGE: &str = "age";
    pub const HEIGHT: &str = "height";
    pub const WEIGHT: &str = "weight";
    pub const GOAL: &str = "goal";
    pub const ACTIVITY_LEVEL: &str = "activity_level";

    /// Total number of wizard steps.
    pub const TOTAL: usize = 5;

    /// All step identifiers, in order.
    pub const ALL: [&str; TOTAL] = [AGE, HEIGHT, WEIGHT, GOAL, ACTIVITY_LEVEL];
}

/// Key of the single profile slot in the local cache.
pub const CACHE_SLOT_KEY: &str = "profile";

/// Binary configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the local cache database file.
    pub cache_path: String,
    /// Base URL of the remote API. `None` runs against in-memory stores.
    pub api_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let cache_path = std::env::var("FITSYNC_CACHE_PATH")
            .unwrap_or_else(|_| "./data/fitsync.db".to_string());
        let api_base_url = std::env::var("FITSYNC_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        Self {
            cache_path,
            api_base_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_identifiers_are_in_wizard_order() {
        assert_eq!(
            steps::ALL,
            ["age", "height", "weight", "goal", "activity_level"]
        );
        assert_eq!(steps::ALL.len(), steps::TOTAL);
    }

    #[test]
    fn bounds_match_data_model() {
        assert_eq!((AGE_MIN, AGE_MAX), (15, 100));
        assert_eq!((HEIGHT_MIN, HEIGHT_MAX), (100, 250));
        assert_eq!((WEIGHT_MIN, WEIGHT_MAX), (30.0, 300.0));
    }
}
