use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::jwt::{decode_claims, TokenClaims};

/// The access/refresh token pair held for a logged-in user.
///
/// Tokens are opaque to the request path: an expired access token is still
/// sent, and only the server's answer decides whether it is usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "accessToken")]
    pub access: String,
    #[serde(rename = "refreshToken")]
    pub refresh: String,
}

impl Credentials {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Claims carried by the access token, when it is a readable JWT.
    pub fn claims(&self) -> Option<TokenClaims> {
        decode_claims(&self.access).ok()
    }

    pub fn roles(&self) -> Vec<String> {
        self.claims().map(|c| c.roles).unwrap_or_default()
    }

    /// Advisory only. Used for display, never to skip sending a request.
    pub fn is_expired(&self) -> bool {
        self.claims().is_some_and(|c| c.is_expired())
    }
}

/// Holds the current credential pair for a session.
///
/// Methods are synchronous so they can be called inside a critical section
/// without an await point.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<Credentials>;

    fn set(&self, credentials: Credentials);

    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

impl std::fmt::Debug for dyn CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Process-local store that forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    current: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            current: RwLock::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credentials> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credentials: Credentials) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credentials);
    }

    fn clear(&self) {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}
