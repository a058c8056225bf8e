//! Client-side session state.
//!
//! A [`SessionStore`] is created once at startup with [`SessionStore::init`],
//! shared through an `Arc` with the API client and every view, and torn down
//! with [`SessionStore::logout`].
//!
//! # Lifecycle
//!
//! - `init` reads the durable token. A stored token makes the session
//!   authenticated immediately, but the profile stays unknown until the next
//!   login: only the token is persisted.
//! - `login` persists the token and replaces the in-memory token and profile.
//! - `logout` clears memory first, then durable storage.
//!
//! No expiry or revocation check happens here; the server rejects stale
//! tokens and the caller decides what to show.

pub mod storage;

pub use storage::{FileTokenStorage, MemoryTokenStorage, StorageError, TOKEN_KEY, TokenStorage};

use secrecy::{ExposeSecret, SecretString};
use taskmanager_core::{Role, UserProfile};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// A point-in-time view of the session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Bearer token, if logged in.
    pub token: Option<SecretString>,
    /// Authenticated user's profile. Absent after a restart until the next
    /// login, even when `token` is present.
    pub user: Option<UserProfile>,
}

impl Session {
    /// True iff a token is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The profile's role, if a profile is loaded.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

/// Process-wide session state with durable token storage.
pub struct SessionStore {
    storage: Box<dyn TokenStorage>,
    state: RwLock<Session>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build the store, restoring a previously persisted token.
    ///
    /// A storage read failure is logged and treated as "no token" so that a
    /// damaged session file never prevents the client from starting.
    pub fn init(storage: impl TokenStorage + 'static) -> Self {
        let token = match storage.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session token");
                None
            }
        };

        if token.is_some() {
            info!("Restored session token; profile unknown until next login");
        }

        Self {
            storage: Box::new(storage),
            state: RwLock::new(Session {
                token: token.map(SecretString::from),
                user: None,
            }),
        }
    }

    /// Record a successful login.
    ///
    /// Persists `token`, then replaces the in-memory token and profile. Makes
    /// no network call: the caller already authenticated.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be persisted. The in-memory
    /// session is left unchanged in that case.
    #[instrument(skip(self, token, profile), fields(username = %profile.username, role = %profile.role))]
    pub async fn login(&self, token: SecretString, profile: UserProfile) -> Result<(), StorageError> {
        self.storage.store(token.expose_secret())?;

        let mut state = self.state.write().await;
        state.token = Some(token);
        state.user = Some(profile);
        info!("Session started");
        Ok(())
    }

    /// End the session. Idempotent.
    ///
    /// Memory is cleared before storage, so [`Self::is_authenticated`] is
    /// false afterwards even when this returns an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the persisted token could not be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), StorageError> {
        {
            let mut state = self.state.write().await;
            let was_authenticated = state.token.is_some();
            *state = Session::default();
            if was_authenticated {
                info!("Session ended");
            }
        }
        self.storage.clear()
    }

    /// True iff a token is held in memory. The token is not verified.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// The current profile's role, or `None` if no profile is loaded.
    pub async fn current_role(&self) -> Option<Role> {
        self.state.read().await.role()
    }

    /// The current profile, if loaded.
    pub async fn profile(&self) -> Option<UserProfile> {
        self.state.read().await.user.clone()
    }

    /// The current bearer token, if any.
    pub async fn token(&self) -> Option<SecretString> {
        self.state.read().await.token.clone()
    }

    /// A copy of the whole session.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use taskmanager_core::{Email, UserId};

    use super::*;

    fn profile(role: Role) -> UserProfile {
        UserProfile {
            id: UserId::new(1),
            username: "alice".to_string(),
            email: Email::parse("a@x.com").unwrap(),
            role,
        }
    }

    /// Storage that refuses every write, for failure paths.
    struct BrokenStorage;

    impl TokenStorage for BrokenStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn store(&self, _token: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }

        fn clear(&self) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    /// Storage shared between two stores, to simulate a restart.
    #[derive(Clone, Default)]
    struct SharedStorage(Arc<MemoryTokenStorage>);

    impl TokenStorage for SharedStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            self.0.load()
        }

        fn store(&self, token: &str) -> Result<(), StorageError> {
            self.0.store(token)
        }

        fn clear(&self) -> Result<(), StorageError> {
            self.0.clear()
        }
    }

    #[tokio::test]
    async fn test_fresh_store_is_anonymous() {
        let store = SessionStore::init(MemoryTokenStorage::new());
        assert!(!store.is_authenticated().await);
        assert_eq!(store.current_role().await, None);
    }

    #[tokio::test]
    async fn test_login_then_authenticated_with_role() {
        for role in [Role::User, Role::Admin] {
            let store = SessionStore::init(MemoryTokenStorage::new());
            store
                .login(SecretString::from("tok"), profile(role))
                .await
                .unwrap();
            assert!(store.is_authenticated().await);
            assert_eq!(store.current_role().await, Some(role));
            assert_eq!(store.token().await.unwrap().expose_secret(), "tok");
        }
    }

    #[tokio::test]
    async fn test_login_replaces_profile_wholesale() {
        let store = SessionStore::init(MemoryTokenStorage::new());
        store
            .login(SecretString::from("a"), profile(Role::Admin))
            .await
            .unwrap();

        let mut other = profile(Role::User);
        other.username = "bob".to_string();
        store.login(SecretString::from("b"), other).await.unwrap();

        let session = store.snapshot().await;
        assert_eq!(session.user.unwrap().username, "bob");
        assert_eq!(session.token.unwrap().expose_secret(), "b");
    }

    #[tokio::test]
    async fn test_logout_always_unauthenticates() {
        let store = SessionStore::init(MemoryTokenStorage::with_token("stale"));
        store.logout().await.unwrap();
        assert!(!store.is_authenticated().await);

        // Idempotent.
        store.logout().await.unwrap();
        assert!(!store.is_authenticated().await);
        assert_eq!(store.profile().await, None);
    }

    #[tokio::test]
    async fn test_logout_with_broken_storage_still_clears_memory() {
        let store = SessionStore::init(BrokenStorage);
        assert!(!store.is_authenticated().await);
        assert!(store.logout().await.is_err());
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_login_storage_failure_keeps_previous_state() {
        let store = SessionStore::init(BrokenStorage);
        let result = store.login(SecretString::from("t"), profile(Role::User)).await;
        assert!(result.is_err());
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_restart_restores_token_but_not_profile() {
        let storage = SharedStorage::default();

        let first = SessionStore::init(storage.clone());
        first
            .login(SecretString::from("persisted"), profile(Role::Admin))
            .await
            .unwrap();

        let second = SessionStore::init(storage.clone());
        assert!(second.is_authenticated().await);
        assert_eq!(second.current_role().await, None);
        assert_eq!(second.token().await.unwrap().expose_secret(), "persisted");

        second.logout().await.unwrap();
        let third = SessionStore::init(storage);
        assert!(!third.is_authenticated().await);
    }
}
