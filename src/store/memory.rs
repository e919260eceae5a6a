//! In-memory implementations of the collaborator traits.
//!
//! Used by the demo binary when no remote API is configured and by the
//! test suite. The record store has an `offline` switch so outage paths
//! can be exercised deterministically.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AuthError, StoreError};
use crate::profile::{Profile, ProfileUpdate};
use crate::store::traits::{AuthGateway, Identity, ProfileCache, RecordStore};

struct Account {
    id: String,
    password: String,
}

/// In-memory authentication gateway. Mints uuid identities and keeps the
/// session in a synchronous slot so `current_identity` stays non-async.
pub struct MemoryGateway {
    accounts: Mutex<HashMap<String, Account>>,
    session: RwLock<Option<Identity>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: RwLock::new(None),
        }
    }

    fn set_session(&self, identity: Option<Identity>) {
        *self.session.write().expect("session lock poisoned") = identity;
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthGateway for MemoryGateway {
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let accounts = self.accounts.lock().await;
        let account = accounts
            .get(email)
            .filter(|a| a.password == password.expose_secret())
            .ok_or_else(|| AuthError::InvalidCredentials {
                email: email.to_string(),
            })?;
        let identity = Identity {
            id: account.id.clone(),
            email: email.to_string(),
        };
        self.set_session(Some(identity.clone()));
        Ok(identity)
    }

    async fn register(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(AuthError::EmailInUse {
                email: email.to_string(),
            });
        }
        let id = Uuid::new_v4().to_string();
        accounts.insert(
            email.to_string(),
            Account {
                id: id.clone(),
                password: password.expose_secret().to_string(),
            },
        );
        let identity = Identity {
            id,
            email: email.to_string(),
        };
        self.set_session(Some(identity.clone()));
        Ok(identity)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            Ok(())
        } else {
            Err(AuthError::AccountNotFound {
                email: email.to_string(),
            })
        }
    }

    async fn sign_out(&self) {
        self.set_session(None);
    }

    fn current_identity(&self) -> Option<String> {
        self.session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.id.clone())
    }

    fn current_email(&self) -> Option<String> {
        self.session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.email.clone())
    }
}

/// In-memory remote record store with last-write-wins semantics and an
/// outage switch for failure injection.
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, Profile>>,
    offline: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored records. Bypasses the outage switch.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Network("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        self.check_online()?;
        Ok(self.records.lock().await.get(id).cloned())
    }

    async fn set(&self, id: &str, profile: &Profile) -> Result<(), StoreError> {
        self.check_online()?;
        self.records
            .lock()
            .await
            .insert(id.to_string(), profile.clone());
        Ok(())
    }

    async fn merge(&self, id: &str, update: &ProfileUpdate) -> Result<(), StoreError> {
        self.check_online()?;
        let mut records = self.records.lock().await;
        let existing = records
            .get(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let merged = existing.with_update(update);
        records.insert(id.to_string(), merged);
        Ok(())
    }
}

/// In-memory single-slot cache: one `(key, value)` pair, replaced
/// atomically on every put.
pub struct MemoryCache {
    slot: Mutex<Option<(String, String)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileCache for MemoryCache {
    async fn put(&self, key: &str, serialized: &str) -> Result<(), StoreError> {
        *self.slot.lock().await = Some((key.to_string(), serialized.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .slot
            .lock()
            .await
            .as_ref()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|(k, _)| k == key) {
            *slot = None;
        }
        Ok(())
    }
}
