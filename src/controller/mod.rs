//! `ProfileController` — orchestrates asynchronous store operations and
//! holds the single observable state surface for presentation layers.
//!
//! Every user-initiated action follows the same protocol: set
//! `loading = true`, run the store operation on a detached task, set the
//! action's one-shot result slot, set `loading = false`, and on success
//! fold the outcome into the observable state. Actions are never
//! cancelled: a task runs to completion even if every consumer is gone,
//! holding only a `Weak` handle to the shared state so post-completion
//! updates degrade to no-ops.

pub mod state;

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

use crate::config::CACHE_SLOT_KEY;
use crate::error::{AuthError, StoreError};
use crate::metrics;
use crate::onboarding::OnboardingDraft;
use crate::profile::{Profile, ProfileUpdate};
use crate::store::{ProfileCache, ProfileStore};

pub use state::{ControllerState, Slot};

/// Outcome of a user-initiated action, delivered through a one-shot slot.
pub type ActionResult = Result<(), StoreError>;

struct ControllerInner {
    store: Arc<ProfileStore>,
    cache: Arc<dyn ProfileCache>,
    state_tx: watch::Sender<ControllerState>,
    sign_in_result: Slot<ActionResult>,
    register_result: Slot<ActionResult>,
    reset_result: Slot<ActionResult>,
    update_result: Slot<ActionResult>,
    onboarding_result: Slot<ActionResult>,
}

impl ControllerInner {
    /// Fold a profile into the state, recomputing derived metrics.
    /// Profiles with incomplete measurements leave metrics unset so a
    /// defaulted profile never yields a BMI of infinity.
    fn apply_profile(state: &mut ControllerState, profile: Profile) {
        state.metrics = profile
            .has_complete_measurements()
            .then(|| metrics::compute_all(&profile));
        state.profile = Some(profile);
    }

    fn finish_ok(&self, slot: &Slot<ActionResult>, apply: impl FnOnce(&mut ControllerState)) {
        slot.set(Ok(()));
        self.state_tx.send_modify(|s| {
            s.loading = false;
            s.last_error = None;
            apply(s);
        });
    }

    fn finish_err(&self, slot: &Slot<ActionResult>, error: StoreError) {
        slot.set(Err(error.clone()));
        self.state_tx.send_modify(|s| {
            s.loading = false;
            s.last_error = Some(error);
        });
    }
}

/// Orchestrates store operations and publishes observable state.
///
/// Cheap to clone; all clones share the same state surface. Collaborators
/// are injected at construction so tests can substitute in-memory stubs.
#[derive(Clone)]
pub struct ProfileController {
    inner: Arc<ControllerInner>,
}

impl ProfileController {
    pub fn new(store: Arc<ProfileStore>, cache: Arc<dyn ProfileCache>) -> Self {
        let initial = ControllerState {
            identity: store.current_identity(),
            email: store.current_email(),
            signed_in: store.is_authenticated(),
            ..ControllerState::default()
        };
        let (state_tx, _) = watch::channel(initial);
        Self {
            inner: Arc::new(ControllerInner {
                store,
                cache,
                state_tx,
                sign_in_result: Slot::new(),
                register_result: Slot::new(),
                reset_result: Slot::new(),
                update_result: Slot::new(),
                onboarding_result: Slot::new(),
            }),
        }
    }

    // ── Observation ─────────────────────────────────────────────────

    /// Authoritative snapshot of the current state.
    pub fn state(&self) -> ControllerState {
        self.inner.state_tx.borrow().clone()
    }

    /// Subscribe to state changes. Consumers own their subscription
    /// teardown: dropping the receiver is all that is needed.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.inner.state_tx.subscribe()
    }

    /// The subscription as a `Stream` of snapshots.
    pub fn watch_stream(&self) -> WatchStream<ControllerState> {
        WatchStream::new(self.subscribe())
    }

    // ── One-shot results ────────────────────────────────────────────

    pub fn take_sign_in_result(&self) -> Option<ActionResult> {
        self.inner.sign_in_result.take()
    }

    pub fn take_register_result(&self) -> Option<ActionResult> {
        self.inner.register_result.take()
    }

    pub fn take_password_reset_result(&self) -> Option<ActionResult> {
        self.inner.reset_result.take()
    }

    pub fn take_update_result(&self) -> Option<ActionResult> {
        self.inner.update_result.take()
    }

    pub fn take_onboarding_result(&self) -> Option<ActionResult> {
        self.inner.onboarding_result.take()
    }

    // ── Actions ─────────────────────────────────────────────────────
    //
    // Each action returns the handle of its detached task. Dropping the
    // handle does not cancel the task; awaiting it is how tests (and any
    // caller that cares) observe completion.

    pub fn sign_in(&self, email: String, password: SecretString) -> JoinHandle<()> {
        self.begin();
        let store = Arc::clone(&self.inner.store);
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let result = store.sign_in(&email, &password).await;
            let Some(inner) = weak.upgrade() else {
                debug!("Consumer gone, dropping sign-in result");
                return;
            };
            match result {
                Ok(identity) => {
                    info!(id = %identity.id, "Signed in");
                    inner.finish_ok(&inner.sign_in_result, |s| {
                        s.signed_in = true;
                        s.identity = Some(identity.id);
                        s.email = Some(identity.email);
                    });
                }
                Err(e) => inner.finish_err(&inner.sign_in_result, e.into()),
            }
        })
    }

    /// Register a new account. On gateway success the all-default profile
    /// is created and saved remotely before the action completes.
    pub fn register(&self, email: String, password: SecretString) -> JoinHandle<()> {
        self.begin();
        let store = Arc::clone(&self.inner.store);
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let registered = store.register(&email, &password).await;
            let outcome = match registered {
                Ok(identity) => {
                    let profile = Profile::new_registered(&identity.id, &identity.email);
                    store
                        .save_profile(&profile)
                        .await
                        .map(|()| (identity, profile))
                }
                Err(e) => Err(e.into()),
            };

            let Some(inner) = weak.upgrade() else {
                debug!("Consumer gone, dropping register result");
                return;
            };
            match outcome {
                Ok((identity, profile)) => {
                    info!(id = %identity.id, "Registered");
                    inner.finish_ok(&inner.register_result, |s| {
                        s.signed_in = true;
                        s.identity = Some(identity.id);
                        s.email = Some(identity.email);
                        ControllerInner::apply_profile(s, profile);
                    });
                }
                Err(e) => inner.finish_err(&inner.register_result, e),
            }
        })
    }

    pub fn request_password_reset(&self, email: String) -> JoinHandle<()> {
        self.begin();
        let store = Arc::clone(&self.inner.store);
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let result = store.request_password_reset(&email).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            match result {
                Ok(()) => inner.finish_ok(&inner.reset_result, |_| {}),
                Err(e) => inner.finish_err(&inner.reset_result, e.into()),
            }
        })
    }

    /// Load the current identity's profile.
    ///
    /// On a failed remote read the store already consulted the cache;
    /// this path then consults it once more directly and republishes
    /// whatever it finds. The duplication is deliberate belt-and-braces,
    /// so the slot is read up to twice per failed remote read.
    pub fn load_profile(&self) -> JoinHandle<()> {
        self.begin();
        let store = Arc::clone(&self.inner.store);
        let cache = Arc::clone(&self.inner.cache);
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let Some(id) = store.current_identity() else {
                if let Some(inner) = weak.upgrade() {
                    inner.state_tx.send_modify(|s| {
                        s.loading = false;
                        s.last_error = Some(AuthError::NotSignedIn.into());
                    });
                }
                return;
            };

            let result = store.fetch_profile(&id).await;
            let fallback = match &result {
                Ok(_) => None,
                Err(_) => read_cache_direct(cache.as_ref(), &id).await,
            };

            let Some(inner) = weak.upgrade() else {
                debug!("Consumer gone, dropping loaded profile");
                return;
            };
            match (result, fallback) {
                (Ok(profile), _) | (Err(_), Some(profile)) => {
                    inner.state_tx.send_modify(|s| {
                        s.loading = false;
                        s.last_error = None;
                        ControllerInner::apply_profile(s, profile);
                    });
                }
                (Err(cause), None) => {
                    inner.state_tx.send_modify(|s| {
                        s.loading = false;
                        s.last_error = Some(cause);
                    });
                }
            }
        })
    }

    /// Apply a partial edit to the loaded profile. `id`, `email`, and the
    /// onboarding flag are untouched.
    pub fn update_profile(&self, update: ProfileUpdate) -> JoinHandle<()> {
        self.begin();
        let base = self.state().profile;
        let store = Arc::clone(&self.inner.store);
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let Some(base) = base else {
                if let Some(inner) = weak.upgrade() {
                    inner.finish_err(&inner.update_result, AuthError::NotSignedIn.into());
                }
                return;
            };

            let edited = base.with_update(&update);
            let result = store.update_profile(&edited).await;
            let Some(inner) = weak.upgrade() else {
                debug!("Consumer gone, dropping update result");
                return;
            };
            match result {
                Ok(()) => {
                    inner.finish_ok(&inner.update_result, |s| {
                        ControllerInner::apply_profile(s, edited);
                    });
                }
                Err(e) => inner.finish_err(&inner.update_result, e),
            }
        })
    }

    /// Commit the onboarding draft as the full profile. The committed
    /// profile carries the fixed default gender — the wizard never
    /// collects one — and `onboarding_completed = true`.
    pub fn complete_onboarding(&self, draft: OnboardingDraft) -> JoinHandle<()> {
        self.begin();
        let store = Arc::clone(&self.inner.store);
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let session = store
                .current_identity()
                .zip(store.current_email());
            let Some((id, email)) = session else {
                if let Some(inner) = weak.upgrade() {
                    inner.finish_err(&inner.onboarding_result, AuthError::NotSignedIn.into());
                }
                return;
            };

            let profile = draft.into_profile(id, email);
            let result = store.save_profile(&profile).await;
            let Some(inner) = weak.upgrade() else {
                debug!("Consumer gone, dropping onboarding result");
                return;
            };
            match result {
                Ok(()) => {
                    info!(id = %profile.id, "Onboarding committed");
                    inner.finish_ok(&inner.onboarding_result, |s| {
                        ControllerInner::apply_profile(s, profile);
                    });
                }
                Err(e) => inner.finish_err(&inner.onboarding_result, e),
            }
        })
    }

    /// End the session. Clears the cache (via the store) and resets the
    /// observable state to signed-out defaults.
    pub fn sign_out(&self) -> JoinHandle<()> {
        self.begin();
        let store = Arc::clone(&self.inner.store);
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            store.sign_out().await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.state_tx.send_modify(|s| *s = ControllerState::default());
        })
    }

    fn begin(&self) {
        self.inner.state_tx.send_modify(|s| s.loading = true);
    }
}

/// The controller's own cache read, independent of the store's fallback.
async fn read_cache_direct(cache: &dyn ProfileCache, id: &str) -> Option<Profile> {
    let serialized = cache.get(CACHE_SLOT_KEY).await.ok().flatten()?;
    let profile: Profile = serde_json::from_str(&serialized).ok()?;
    (profile.id == id).then_some(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ActivityLevel, Gender, Goal};
    use crate::store::{
        AuthGateway, MemoryCache, MemoryGateway, MemoryRecordStore, RecordStore,
    };

    struct Harness {
        controller: ProfileController,
        remote: Arc<MemoryRecordStore>,
        cache: Arc<MemoryCache>,
    }

    fn harness() -> Harness {
        let gateway = Arc::new(MemoryGateway::new());
        let remote = Arc::new(MemoryRecordStore::new());
        let cache = Arc::new(MemoryCache::new());
        let store = Arc::new(ProfileStore::new(
            Arc::clone(&gateway) as Arc<dyn AuthGateway>,
            Arc::clone(&remote) as Arc<dyn RecordStore>,
            Arc::clone(&cache) as Arc<dyn ProfileCache>,
        ));
        let controller =
            ProfileController::new(store, Arc::clone(&cache) as Arc<dyn ProfileCache>);
        Harness {
            controller,
            remote,
            cache,
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn draft() -> OnboardingDraft {
        OnboardingDraft {
            age: 30,
            height: 175,
            weight: 70.0,
            goal: Goal::LoseWeight,
            activity_level: ActivityLevel::Sedentary,
        }
    }

    #[tokio::test]
    async fn register_creates_default_profile_without_metrics() {
        let h = harness();
        h.controller
            .register("a@example.com".to_string(), secret("secret1"))
            .await
            .unwrap();

        assert_eq!(h.controller.take_register_result(), Some(Ok(())));
        // One-shot: a second take yields nothing.
        assert_eq!(h.controller.take_register_result(), None);

        let state = h.controller.state();
        assert!(state.signed_in);
        assert!(!state.loading);
        let profile = state.profile.unwrap();
        assert!(!profile.onboarding_completed);
        assert_eq!(profile.age, 0);
        // Defaulted profile must not produce metrics.
        assert!(state.metrics.is_none());
    }

    #[tokio::test]
    async fn sign_in_failure_sets_slot_and_last_error() {
        let h = harness();
        h.controller
            .sign_in("nobody@example.com".to_string(), secret("secret1"))
            .await
            .unwrap();

        let result = h.controller.take_sign_in_result().unwrap();
        assert!(matches!(
            result,
            Err(StoreError::Auth(AuthError::InvalidCredentials { .. }))
        ));
        let state = h.controller.state();
        assert!(!state.signed_in);
        assert!(!state.loading);
        assert!(state.last_error.is_some());
    }

    #[tokio::test]
    async fn onboarding_commit_publishes_metrics() {
        let h = harness();
        h.controller
            .register("a@example.com".to_string(), secret("secret1"))
            .await
            .unwrap();
        h.controller.complete_onboarding(draft()).await.unwrap();

        assert_eq!(h.controller.take_onboarding_result(), Some(Ok(())));
        let state = h.controller.state();
        let profile = state.profile.unwrap();
        assert!(profile.onboarding_completed);
        assert_eq!(profile.gender, Gender::Male);

        let metrics = state.metrics.unwrap();
        assert_eq!(metrics.bmr, 1648);
        assert_eq!(metrics.tdee, 1978);
        assert_eq!(metrics.daily_calorie_goal, 1478);
    }

    #[tokio::test]
    async fn onboarding_commit_without_session_errors() {
        let h = harness();
        h.controller.complete_onboarding(draft()).await.unwrap();
        assert_eq!(
            h.controller.take_onboarding_result(),
            Some(Err(StoreError::Auth(AuthError::NotSignedIn)))
        );
    }

    #[tokio::test]
    async fn load_profile_falls_back_to_cache_during_outage() {
        let h = harness();
        h.controller
            .register("a@example.com".to_string(), secret("secret1"))
            .await
            .unwrap();
        h.controller.complete_onboarding(draft()).await.unwrap();

        h.remote.set_offline(true);
        h.controller.load_profile().await.unwrap();

        let state = h.controller.state();
        assert!(state.last_error.is_none());
        assert!(state.profile.unwrap().onboarding_completed);
        assert!(state.metrics.is_some());
    }

    #[tokio::test]
    async fn load_profile_surfaces_error_when_cache_is_empty_too() {
        let h = harness();
        h.controller
            .register("a@example.com".to_string(), secret("secret1"))
            .await
            .unwrap();

        h.remote.set_offline(true);
        h.cache.remove(CACHE_SLOT_KEY).await.unwrap();
        h.controller.load_profile().await.unwrap();

        let state = h.controller.state();
        assert!(matches!(state.last_error, Some(StoreError::Network(_))));
    }

    #[tokio::test]
    async fn update_profile_recomputes_metrics() {
        let h = harness();
        h.controller
            .register("a@example.com".to_string(), secret("secret1"))
            .await
            .unwrap();
        h.controller.complete_onboarding(draft()).await.unwrap();

        let update = ProfileUpdate {
            age: 30,
            height: 175,
            weight: 80.0,
            goal: Goal::GainMuscle,
            activity_level: ActivityLevel::ModeratelyActive,
        };
        h.controller.update_profile(update).await.unwrap();

        assert_eq!(h.controller.take_update_result(), Some(Ok(())));
        let state = h.controller.state();
        let metrics = state.metrics.unwrap();
        // BMR 10*80 + 6.25*175 - 5*30 + 5 = 1748.75; TDEE *1.55 = 2710.5625.
        assert_eq!(metrics.bmr, 1748);
        assert_eq!(metrics.tdee, 2710);
        assert_eq!(metrics.daily_calorie_goal, 3010);
        // The flag survives partial edits.
        assert!(state.profile.unwrap().onboarding_completed);
    }

    #[tokio::test]
    async fn update_profile_without_loaded_profile_errors() {
        let h = harness();
        let update = ProfileUpdate {
            age: 30,
            height: 175,
            weight: 80.0,
            goal: Goal::Maintain,
            activity_level: ActivityLevel::Sedentary,
        };
        h.controller.update_profile(update).await.unwrap();
        assert_eq!(
            h.controller.take_update_result(),
            Some(Err(StoreError::Auth(AuthError::NotSignedIn)))
        );
    }

    #[tokio::test]
    async fn sign_out_resets_state_and_cache() {
        let h = harness();
        h.controller
            .register("a@example.com".to_string(), secret("secret1"))
            .await
            .unwrap();
        h.controller.complete_onboarding(draft()).await.unwrap();

        h.controller.sign_out().await.unwrap();

        let state = h.controller.state();
        assert_eq!(state, ControllerState::default());
        assert_eq!(h.cache.get(CACHE_SLOT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn task_outlives_dropped_controller() {
        let h = harness();
        let handle = h
            .controller
            .register("a@example.com".to_string(), secret("secret1"));
        drop(h.controller);
        // The store operation still runs to completion; the state update
        // degrades to a no-op.
        handle.await.unwrap();
        assert_eq!(h.remote.len().await, 1);
    }

    #[tokio::test]
    async fn watch_subscribers_see_the_completed_action() {
        let h = harness();
        let mut rx = h.controller.subscribe();

        let _handle = h
            .controller
            .register("a@example.com".to_string(), secret("secret1"));
        let state = rx
            .wait_for(|s| s.signed_in && !s.loading)
            .await
            .unwrap()
            .clone();
        assert!(state.profile.is_some());
    }
}
