//! `ProfileStore` — mediates between the authentication gateway, the
//! remote record store, and the local cache.
//!
//! Remote reads and writes go through the cache: every success overwrites
//! the local slot wholesale, and a failed remote read falls back to
//! whatever the slot holds (with no staleness check — the mirror may be
//! arbitrarily old). Failures never propagate as panics; every operation
//! returns an outcome.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::config::CACHE_SLOT_KEY;
use crate::error::{AuthError, StoreError};
use crate::profile::{Profile, ProfileUpdate};
use crate::store::traits::{AuthGateway, Identity, ProfileCache, RecordStore};

pub struct ProfileStore {
    gateway: Arc<dyn AuthGateway>,
    remote: Arc<dyn RecordStore>,
    cache: Arc<dyn ProfileCache>,
}

impl ProfileStore {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        remote: Arc<dyn RecordStore>,
        cache: Arc<dyn ProfileCache>,
    ) -> Self {
        Self {
            gateway,
            remote,
            cache,
        }
    }

    // ── Session ─────────────────────────────────────────────────────

    pub async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        self.gateway.sign_in(email, password).await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        self.gateway.register(email, password).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.gateway.send_password_reset(email).await
    }

    /// Ends the session and clears the local cache slot. A cache failure
    /// here is logged and swallowed — sign-out itself cannot fail.
    pub async fn sign_out(&self) {
        self.gateway.sign_out().await;
        if let Err(e) = self.cache.remove(CACHE_SLOT_KEY).await {
            warn!(error = %e, "Failed to clear cached profile on sign-out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.gateway.current_identity().is_some()
    }

    pub fn current_identity(&self) -> Option<String> {
        self.gateway.current_identity()
    }

    pub fn current_email(&self) -> Option<String> {
        self.gateway.current_email()
    }

    // ── Profile records ─────────────────────────────────────────────

    /// Write the profile wholesale to the remote store, then mirror it
    /// into the cache. No cache write happens on remote failure.
    pub async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        self.remote.set(&profile.id, profile).await?;
        self.write_through(profile).await;
        Ok(())
    }

    /// Merge the editable fields into the remote record, then mirror the
    /// full given profile into the cache.
    pub async fn update_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let update = ProfileUpdate::from_profile(profile);
        self.remote.merge(&profile.id, &update).await?;
        self.write_through(profile).await;
        Ok(())
    }

    /// Read the profile from the remote store. On success the cache slot
    /// is overwritten with the remote value; on failure the slot is
    /// consulted and, if it holds a record for this id, returned as a
    /// success. Only when both miss does the original failure surface.
    pub async fn fetch_profile(&self, id: &str) -> Result<Profile, StoreError> {
        let remote_result = match self.remote.get(id).await {
            Ok(Some(profile)) => Ok(profile),
            Ok(None) => Err(StoreError::NotFound { id: id.to_string() }),
            Err(e) => Err(e),
        };

        match remote_result {
            Ok(profile) => {
                self.write_through(&profile).await;
                Ok(profile)
            }
            Err(cause) => {
                debug!(%id, error = %cause, "Remote read failed, consulting cache");
                match self.read_cached(id).await {
                    Some(profile) => Ok(profile),
                    None => Err(cause),
                }
            }
        }
    }

    /// Whether the user has finished onboarding. Delegates to
    /// [`fetch_profile`](Self::fetch_profile) and swallows every failure
    /// into `false`: the completion check must never block UI flow.
    pub async fn has_completed_onboarding(&self, id: &str) -> bool {
        match self.fetch_profile(id).await {
            Ok(profile) => profile.onboarding_completed,
            Err(e) => {
                warn!(%id, error = %e, "Onboarding check failed, treating as incomplete");
                false
            }
        }
    }

    /// Read the cache slot, returning the profile it holds if that
    /// profile belongs to `id`. A slot left by another account is a miss.
    pub async fn read_cached(&self, id: &str) -> Option<Profile> {
        let serialized = match self.cache.get(CACHE_SLOT_KEY).await {
            Ok(Some(s)) => s,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Cache read failed");
                return None;
            }
        };
        match serde_json::from_str::<Profile>(&serialized) {
            Ok(profile) if profile.id == id => Some(profile),
            Ok(profile) => {
                debug!(cached = %profile.id, requested = %id, "Cached profile is for another id");
                None
            }
            Err(e) => {
                warn!(error = %e, "Cached profile failed to deserialize");
                None
            }
        }
    }

    /// Mirror a profile into the cache slot. The mirror is best-effort:
    /// a cache failure is logged, never surfaced.
    async fn write_through(&self, profile: &Profile) {
        let serialized = match serde_json::to_string(profile) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize profile for cache");
                return;
            }
        };
        if let Err(e) = self.cache.put(CACHE_SLOT_KEY, &serialized).await {
            warn!(error = %e, "Cache write-through failed");
        }
    }
}
