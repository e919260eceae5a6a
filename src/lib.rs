//! Fitsync — profile synchronization and onboarding core.
//!
//! Keeps a user profile consistent between a remote authoritative store
//! and a local fallback cache, drives the onboarding wizard, and
//! republishes derived health metrics whenever the profile changes.

pub mod config;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod onboarding;
pub mod profile;
pub mod store;
