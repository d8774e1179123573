//! Bearer-token session.
//!
//! [`Session`] is the explicit handle every component receives instead of
//! reading a global token. It keeps the token in memory and mirrors it,
//! with the signed-in account, into [`Storage`] so a later process can
//! resume the session.

use std::sync::{Arc, RwLock};

use jyotish_core::person::Person;

use crate::messages::AuthResponse;
use crate::storage::{Storage, StorageError};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key of the serialized account.
pub const USER_KEY: &str = "user";

/// Cheaply cloneable session handle; clones share state.
#[derive(Clone)]
pub struct Session {
    storage: Arc<dyn Storage>,
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    /// Resume whatever session the storage holds.
    pub fn restore(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let token = storage.get(TOKEN_KEY)?.filter(|t| !t.trim().is_empty());
        tracing::debug!(authenticated = token.is_some(), "Session restored");
        Ok(Self {
            storage,
            token: Arc::new(RwLock::new(token)),
        })
    }

    /// A session with no token, backed by `storage`.
    pub fn anonymous(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Record a successful sign-in: token and account.
    pub fn begin(&self, auth: &AuthResponse) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, &auth.access_token)?;
        self.store_user(&auth.user)?;
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(auth.access_token.clone());
        tracing::info!(user = %auth.user.name, "Signed in");
        Ok(())
    }

    /// Forget the token and account. Used for explicit logout and when
    /// the backend rejects the token.
    pub fn end(&self) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub fn store_user(&self, user: &Person) -> Result<(), StorageError> {
        match serde_json::to_string(user) {
            Ok(json) => self.storage.set(USER_KEY, &json),
            Err(e) => {
                tracing::warn!(error = %e, "Account could not be serialized, not caching it");
                Ok(())
            }
        }
    }

    /// The account stored at sign-in, if any. An unreadable entry is
    /// treated as absent.
    pub fn cached_user(&self) -> Result<Option<Person>, StorageError> {
        let Some(raw) = self.storage.get(USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!(error = %e, "Cached account is malformed, ignoring it");
                Ok(None)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
