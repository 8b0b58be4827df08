//! Session state holder.
//!
//! The single source of truth for "am I logged in": the latest known user
//! record plus an `initialized` flag that flips to true once at least one
//! resolution attempt has completed, successfully or not. Components must
//! not treat an absent user as "logged out" before `initialized` is true.
//!
//! Observation is an explicit publish/subscribe channel with replay-one
//! semantics: each subscriber immediately receives the most recent state,
//! then every subsequent [`SessionHolder::set`] in invocation order.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

use crate::auth::models::User;
use crate::net::errors::ApiError;
use crate::storage::{Storage, USER_KEY};

/// Latest known authentication state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub initialized: bool,
}

/// Remote source of the current user record.
///
/// The seam between the session holder and the network: resolution asks
/// this for a "who am I" fetch when the local cache comes up empty.
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn fetch_current(&self) -> Result<User, ApiError>;
}

struct Inner {
    state: SessionState,
    subscribers: Vec<mpsc::UnboundedSender<SessionState>>,
}

/// Reactive holder of the current user.
pub struct SessionHolder {
    inner: Mutex<Inner>,
    storage: Storage,
}

impl SessionHolder {
    pub fn new(storage: Storage) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: SessionState::default(),
                subscribers: Vec::new(),
            }),
            storage,
        }
    }

    /// Latest known user, non-blocking.
    pub fn current(&self) -> Option<User> {
        self.lock().state.user.clone()
    }

    /// Whether at least one resolution attempt has completed.
    pub fn initialized(&self) -> bool {
        self.lock().state.initialized
    }

    /// Latest known state, non-blocking.
    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Subscribe to session state.
    ///
    /// The receiver is seeded with the current state and then receives
    /// every published state, in order, with no coalescing.
    pub fn observe(&self) -> mpsc::UnboundedReceiver<SessionState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let _ = tx.send(inner.state.clone());
        inner.subscribers.push(tx);
        rx
    }

    /// Publish a new user value.
    ///
    /// A present user is persisted to the storage cache; an absent one
    /// removes the cached entry. Either way the session becomes
    /// initialized. The lock spans persist and publish, so concurrent
    /// `set` calls persist and publish in the same order.
    pub fn set(&self, user: Option<User>) {
        let mut inner = self.lock();
        match &user {
            Some(user) => {
                if let Err(error) = self.storage.store_item(USER_KEY, user) {
                    log::warn!("failed to cache user record: {error}");
                }
            }
            None => self.storage.remove_item(USER_KEY),
        }
        inner.state = SessionState {
            user,
            initialized: true,
        };
        let state = inner.state.clone();
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(state.clone()).is_ok());
    }

    /// Resolve the current user, returning exactly once and never erring.
    ///
    /// The storage cache is consulted first and a hit is adopted via
    /// [`set`](Self::set) even when an in-memory value already exists:
    /// last write wins, with no freshness check. On a cache miss the
    /// remote source is asked; success adopts the fetched record, failure
    /// degrades to an unauthenticated (but initialized) session.
    pub async fn resolve(&self, source: &dyn UserSource) -> Option<User> {
        if let Some(cached) = self.storage.get_item::<User>(USER_KEY) {
            self.set(Some(cached.clone()));
            return Some(cached);
        }
        match source.fetch_current().await {
            Ok(user) => {
                self.set(Some(user.clone()));
                Some(user)
            }
            Err(error) => {
                log::debug!("session resolution failed: {error}");
                self.set(None);
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("session lock poisoned")
    }
}
