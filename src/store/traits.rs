//! Trait seams for the three external collaborators: authentication
//! gateway, remote record store, and local cache.
//!
//! All three are injected into [`ProfileStore`](crate::store::ProfileStore)
//! at construction time so tests can substitute stubs.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::{AuthError, StoreError};
use crate::profile::{Profile, ProfileUpdate};

/// A session identity held by the authentication gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Opaque, stable id assigned at registration.
    pub id: String,
    pub email: String,
}

/// The external authentication gateway. Credential verification details
/// live entirely behind this boundary.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError>;

    async fn register(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn sign_out(&self);

    /// Synchronous read of the current session, if any.
    fn current_identity(&self) -> Option<String>;

    /// Synchronous read of the current session email, if any.
    fn current_email(&self) -> Option<String>;
}

/// The remote, authoritative record store, keyed by profile id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a record. `Ok(None)` means the record does not exist.
    async fn get(&self, id: &str) -> Result<Option<Profile>, StoreError>;

    /// Replace the record wholesale.
    async fn set(&self, id: &str, profile: &Profile) -> Result<(), StoreError>;

    /// Merge the partial record into the existing one.
    async fn merge(&self, id: &str, update: &ProfileUpdate) -> Result<(), StoreError>;
}

/// The local single-slot cache. Values are serialized profiles; writes
/// replace the slot atomically, there is no partial-field merge.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn put(&self, key: &str, serialized: &str) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
