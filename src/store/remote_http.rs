//! HTTP adapters for the authentication gateway and remote record store.
//!
//! Thin reqwest clients against the backend REST API:
//! `POST /auth/signin`, `POST /auth/register`, `POST /auth/reset`,
//! `GET|PUT|PATCH /profiles/{id}`. The session lives client-side in a
//! synchronous slot so `current_identity`/`current_email` never block.

use std::sync::RwLock;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AuthError, StoreError};
use crate::profile::{Profile, ProfileUpdate};
use crate::store::traits::{AuthGateway, Identity, RecordStore};

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    email: String,
}

/// Authentication gateway backed by the REST API.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
    session: RwLock<Option<Identity>>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            session: RwLock::new(None),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn set_session(&self, identity: Option<Identity>) {
        *self.session.write().expect("session lock poisoned") = identity;
    }

    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<reqwest::Response, AuthError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        self.client
            .post(self.api_url(path))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Gateway(e.to_string()))
    }

    async fn read_session(
        &self,
        response: reqwest::Response,
    ) -> Result<Identity, AuthError> {
        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Gateway(format!("invalid session response: {e}")))?;
        let identity = Identity {
            id: session.id,
            email: session.email,
        };
        self.set_session(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl AuthGateway for HttpGateway {
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let response = self.post_credentials("auth/signin", email, password).await?;
        match response.status() {
            status if status.is_success() => self.read_session(response).await,
            reqwest::StatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials {
                email: email.to_string(),
            }),
            status => Err(AuthError::Gateway(format!("signin failed: {status}"))),
        }
    }

    async fn register(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let response = self
            .post_credentials("auth/register", email, password)
            .await?;
        match response.status() {
            status if status.is_success() => self.read_session(response).await,
            reqwest::StatusCode::CONFLICT => Err(AuthError::EmailInUse {
                email: email.to_string(),
            }),
            status => Err(AuthError::Gateway(format!("register failed: {status}"))),
        }
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let body = serde_json::json!({ "email": email });
        let response = self
            .client
            .post(self.api_url("auth/reset"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Gateway(e.to_string()))?;
        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Err(AuthError::AccountNotFound {
                email: email.to_string(),
            }),
            status => Err(AuthError::Gateway(format!("reset failed: {status}"))),
        }
    }

    async fn sign_out(&self) {
        // Fire-once, no server round trip: the session token is simply
        // forgotten client-side.
        debug!("Clearing gateway session");
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

/// Remote record store backed by the REST API.
pub struct HttpRecordStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn profile_url(&self, id: &str) -> String {
        format!("{}/profiles/{id}", self.base_url)
    }

    fn check_write(response: reqwest::Response, id: &str) -> Result<(), StoreError> {
        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Err(StoreError::NotFound { id: id.to_string() }),
            status => Err(StoreError::Network(format!("write failed: {status}"))),
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn get(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        let response = self
            .client
            .get(self.profile_url(id))
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        match response.status() {
            status if status.is_success() => {
                let profile: Profile = response
                    .json()
                    .await
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(profile))
            }
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status => Err(StoreError::Network(format!("get failed: {status}"))),
        }
    }

    async fn set(&self, id: &str, profile: &Profile) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.profile_url(id))
            .json(profile)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Self::check_write(response, id)
    }

    async fn merge(&self, id: &str, update: &ProfileUpdate) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.profile_url(id))
            .json(update)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Self::check_write(response, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let gateway = HttpGateway::new("https://api.example.com/");
        assert_eq!(
            gateway.api_url("auth/signin"),
            "https://api.example.com/auth/signin"
        );

        let store = HttpRecordStore::new("https://api.example.com/");
        assert_eq!(
            store.profile_url("uid-1"),
            "https://api.example.com/profiles/uid-1"
        );
    }

    #[test]
    fn session_slot_starts_empty() {
        let gateway = HttpGateway::new("https://api.example.com");
        assert!(gateway.current_identity().is_none());
        assert!(gateway.current_email().is_none());
    }
}
