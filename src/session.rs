//! Active-user session resolution.
//!
//! Repositories namespace every read and write by the signed-in user.
//! The session itself is a record in the same string store, under the
//! well-known [`SESSION_KEY`], holding a JSON object with `uid` and
//! `email`. When the key is absent (nobody signed in) or unreadable,
//! resolution falls back to the [`DEMO_USER_ID`] sentinel, so
//! unauthenticated access operates on a shared default namespace. That
//! fallback is a documented quirk of the legacy layout, not a security
//! boundary.
//!
//! The user id is re-resolved from the store on **every** operation.
//! Caching it across calls would keep repositories pinned to a stale
//! namespace after a user switch.

use crate::error::{Error, Result};
use crate::store::StringStore;
use serde::{Deserialize, Serialize};

/// Well-known store key holding the active session record.
pub const SESSION_KEY: &str = "crm_session";

/// Sentinel user id used when no session is present.
pub const DEMO_USER_ID: &str = "demo-user";

/// The signed-in user, as persisted under [`SESSION_KEY`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Opaque user id; the namespace every collection is scoped by.
    pub uid: String,
    /// Email of the signed-in user.
    pub email: String,
}

/// Resolves the active user id against a backing store.
///
/// Cloning is cheap; clones share the underlying store.
#[derive(Clone)]
pub struct SessionContext<S: StringStore> {
    store: S,
}

impl<S: StringStore> SessionContext<S> {
    /// Create a context over `store`.
    pub fn new(store: S) -> Self {
        SessionContext { store }
    }

    /// Resolve the active user id.
    ///
    /// Reads [`SESSION_KEY`] fresh from the store; absent or malformed
    /// session records fall back to [`DEMO_USER_ID`].
    ///
    /// # Errors
    /// Returns `Err` only if the backing store itself fails.
    pub async fn current_user_id(&self) -> Result<String> {
        match self.store.get(SESSION_KEY).await? {
            Some(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Ok(session.uid),
                Err(e) => {
                    warn!("Session record is malformed, using demo namespace: {}", e);
                    Ok(DEMO_USER_ID.to_string())
                }
            },
            None => Ok(DEMO_USER_ID.to_string()),
        }
    }

    /// Return the full session record, if one is present.
    ///
    /// # Errors
    /// Returns `Err(Error::NoSession)` when nobody is signed in, or a
    /// backend error if the store fails.
    pub async fn current_session(&self) -> Result<Session> {
        let raw = self
            .store
            .get(SESSION_KEY)
            .await?
            .ok_or(Error::NoSession)?;
        serde_json::from_str(&raw).map_err(|_| Error::NoSession)
    }

    /// Persist `session` as the active session.
    ///
    /// # Errors
    /// Returns `Err` if the session cannot be encoded or stored.
    pub async fn sign_in(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.store.set(SESSION_KEY, raw).await?;
        debug!("Session signed in: {}", session.uid);
        Ok(())
    }

    /// Remove the active session. Subsequent operations use the demo
    /// namespace.
    ///
    /// # Errors
    /// Returns `Err` if the store fails.
    pub async fn sign_out(&self) -> Result<()> {
        self.store.remove(SESSION_KEY).await?;
        debug!("Session signed out");
        Ok(())
    }
}
