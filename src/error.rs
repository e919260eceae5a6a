//! Error types for the profile sync core.

/// Authentication gateway failures — credential and session problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials for {email}")]
    InvalidCredentials { email: String },

    #[error("Email already registered: {email}")]
    EmailInUse { email: String },

    #[error("No account for {email}")]
    AccountNotFound { email: String },

    #[error("No active session")]
    NotSignedIn,

    #[error("Gateway failure: {0}")]
    Gateway(String),
}

/// Store-level failures. Every `ProfileStore` operation normalizes lower
/// failures into this type — nothing throws past the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Record not found: {id}")]
    NotFound { id: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Local cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Client-side per-field validation failures. Raised by the wizard or the
/// edit form before anything reaches the store — never sent remotely.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Age must be between {min} and {max}, got {value}")]
    AgeOutOfRange { value: i32, min: i32, max: i32 },

    #[error("Height must be between {min} and {max} cm, got {value}")]
    HeightOutOfRange { value: i32, min: i32, max: i32 },

    #[error("Weight must be between {min} and {max} kg, got {value}")]
    WeightOutOfRange { value: f64, min: f64, max: f64 },

    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("No value selected for step {step}")]
    MissingValue { step: String },

    #[error("Staged value does not belong to step {step}")]
    StepMismatch { step: String },

    #[error("Onboarding already committed")]
    AlreadyCommitted,
}
