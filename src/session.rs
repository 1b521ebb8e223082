//! Session state: tokens and identity of the signed-in user.
//!
//! DESIGN
//! ======
//! Every setter writes through to [`Storage`] immediately. Reads only ever
//! consult the in-memory copy; external edits to storage are not observed.
//! A session built with [`SessionState::new`] starts empty even if storage
//! holds values from an earlier run; [`SessionState::hydrate`] is the
//! explicit opt-in for restoring them.
//!
//! The password passed to [`SessionState::set_user_info`] is held in memory
//! only. The persisted `user` record carries the non-secret fields.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::Storage;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";
pub const USER_ID_KEY: &str = "user_id";

/// Snapshot of the user identity fields held by a session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub img_url: Option<String>,
}

impl fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInfo")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("img_url", &self.img_url)
            .finish()
    }
}

/// Persisted form of [`UserInfo`] under the `user` key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredUser {
    name: Option<String>,
    surname: Option<String>,
    email: Option<String>,
    #[serde(rename = "imgUrl")]
    img_url: Option<String>,
}

/// Authentication context for one signed-in user.
pub struct SessionState {
    storage: Arc<dyn Storage>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    user_id: Option<String>,
    user: UserInfo,
}

impl SessionState {
    /// Create an empty session that mirrors writes into `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, access_token: None, refresh_token: None, user_id: None, user: UserInfo::default() }
    }

    /// Restore a session from values previously written to `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or the `user` record is
    /// not valid JSON.
    pub fn hydrate(storage: Arc<dyn Storage>) -> Result<Self, StorageError> {
        let access_token = storage.get_item(ACCESS_TOKEN_KEY)?;
        let refresh_token = storage.get_item(REFRESH_TOKEN_KEY)?;
        let user_id = storage.get_item(USER_ID_KEY)?;
        let user = match storage.get_item(USER_KEY)? {
            Some(raw) => {
                let stored: StoredUser = serde_json::from_str(&raw)?;
                UserInfo {
                    email: stored.email,
                    password: None,
                    name: stored.name,
                    surname: stored.surname,
                    img_url: stored.img_url,
                }
            }
            None => UserInfo::default(),
        };

        tracing::debug!(has_access_token = access_token.is_some(), has_user_id = user_id.is_some(), "hydrated session");
        Ok(Self { storage, access_token, refresh_token, user_id, user })
    }

    // =========================================================================
    // TOKENS
    // =========================================================================

    /// Overwrite both tokens. `None` removes the stored key.
    pub fn set_tokens(&mut self, access: Option<String>, refresh: Option<String>) {
        self.mirror(ACCESS_TOKEN_KEY, access.as_deref());
        self.mirror(REFRESH_TOKEN_KEY, refresh.as_deref());
        self.access_token = access;
        self.refresh_token = refresh;
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    // =========================================================================
    // USER
    // =========================================================================

    /// Overwrite the five user fields and persist the non-secret ones as a
    /// single JSON record.
    pub fn set_user_info(
        &mut self,
        email: Option<String>,
        password: Option<String>,
        name: Option<String>,
        surname: Option<String>,
        img_url: Option<String>,
    ) {
        self.user = UserInfo { email, password, name, surname, img_url };

        let stored = StoredUser {
            name: self.user.name.clone(),
            surname: self.user.surname.clone(),
            email: self.user.email.clone(),
            img_url: self.user.img_url.clone(),
        };
        match serde_json::to_string(&stored) {
            Ok(raw) => self.mirror(USER_KEY, Some(&raw)),
            Err(e) => tracing::warn!(error = %e, "user record serialization failed"),
        }
    }

    /// Snapshot of the in-memory user fields.
    #[must_use]
    pub fn user_info(&self) -> UserInfo {
        self.user.clone()
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.mirror(USER_ID_KEY, user_id.as_deref());
        self.user_id = user_id;
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Null out tokens and user info. The user id is left as is.
    pub fn clear(&mut self) {
        self.set_tokens(None, None);
        self.set_user_info(None, None, None, None, None);
    }

    fn mirror(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.storage.set_item(key, value),
            None => self.storage.remove_item(key),
        };
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "session storage write failed");
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("user_id", &self.user_id)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
