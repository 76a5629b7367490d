//! Session store: the single source of truth for who is using the client.
//!
//! The current session lives behind an [`ArcSwapOption`] so any number of
//! concurrent requests can read the token without locking. Writes come only
//! from the login, registration and logout flows and are serialized; the
//! last writer wins. Every write is mirrored to a [`SessionStorage`] so the
//! session survives restarts.

pub mod storage;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::models::{Role, UserProfile};

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the serialized user profile
pub const USER_KEY: &str = "user";

/// An authenticated identity and its bearer token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn role(&self) -> Role {
        self.user.role()
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }
}

// Keeps the token out of logs and panic messages
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

pub struct SessionStore {
    current: ArcSwapOption<Session>,
    storage: Arc<dyn SessionStorage>,
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Open a store, rehydrating any session persisted in `storage`.
    ///
    /// Absent, partial or corrupt data yields an empty store.
    pub fn open(storage: Arc<dyn SessionStorage>) -> Self {
        let restored = rehydrate(storage.as_ref());
        match &restored {
            Some(session) => info!(user_id = session.user.id, "Restored saved session"),
            None => debug!("No saved session"),
        }

        Self {
            current: ArcSwapOption::new(restored.map(Arc::new)),
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// A store that only lives in memory
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()))
    }

    pub fn get(&self) -> Option<Arc<Session>> {
        self.current.load_full()
    }

    pub fn token(&self) -> Option<String> {
        self.current.load().as_ref().map(|s| s.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replace the current session and persist it.
    ///
    /// The in-memory session is updated even when persisting fails; the
    /// failure is logged and the session simply won't survive a restart.
    pub fn set(&self, session: Session) {
        let _guard = self.write_lock.lock();

        if let Err(e) = persist(self.storage.as_ref(), &session) {
            warn!(error = %e, "Failed to persist session");
        }

        info!(user_id = session.user.id, role = %session.role(), "Session started");
        self.current.store(Some(Arc::new(session)));
    }

    /// Drop the current session from memory and durable storage.
    pub fn clear(&self) {
        let _guard = self.write_lock.lock();

        if let Some(previous) = self.current.swap(None) {
            info!(user_id = previous.user.id, "Session cleared");
        }

        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(error = %e, key, "Failed to remove stored session data");
            }
        }
    }
}

/// The previous token goes first, so a partial write can never pair the
/// new user with an old token.
fn persist(storage: &dyn SessionStorage, session: &Session) -> Result<(), StorageError> {
    let user = serde_json::to_string(&session.user)?;
    storage.remove(TOKEN_KEY)?;
    storage.write_all(&[(USER_KEY, user.as_str()), (TOKEN_KEY, session.token.as_str())])
}

fn rehydrate(storage: &dyn SessionStorage) -> Option<Session> {
    let read = |key| match storage.read(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, key, "Ignoring unreadable saved session");
            None
        }
    };

    let token = read(TOKEN_KEY).filter(|t| !t.trim().is_empty());
    let user = read(USER_KEY);

    match (token, user) {
        (Some(token), Some(user)) => match serde_json::from_str::<UserProfile>(&user) {
            Ok(user) => Some(Session { token, user }),
            Err(e) => {
                warn!(error = %e, "Ignoring saved session with corrupt user profile");
                None
            }
        },
        (None, None) => None,
        _ => {
            warn!("Ignoring incomplete saved session");
            None
        }
    }
}
