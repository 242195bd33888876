pub mod auth;
pub mod card;
pub mod user;

use std::sync::Arc;

use crate::config::Profile;
use crate::coordinator::{AuthenticatedRequestCoordinator, CoordinatorOptions};
use crate::credentials::CredentialStore;
use crate::error::NamecardError;
use crate::transport::Transport;
use crate::transports::HttpTransport;

pub use auth::AuthApi;
pub use card::{CardApi, PublicCardApi};
pub use user::UserApi;

/// Entry point for the card service API.
#[derive(Debug, Clone)]
pub struct NamecardClient {
    coordinator: Arc<AuthenticatedRequestCoordinator>,
}

impl NamecardClient {
    pub fn new(coordinator: Arc<AuthenticatedRequestCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Build an HTTP-backed client for a resolved profile.
    pub fn from_profile(
        profile: &Profile,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, NamecardError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
            &profile.base_url,
            &profile.headers,
            profile.allow_http,
            Some(profile.request_timeout),
        )?);
        let options = CoordinatorOptions {
            refresh_path: profile.refresh_path.clone(),
            refresh_timeout: profile.refresh_timeout,
            auth_scheme: profile.auth_scheme.clone(),
        };
        Ok(Self::new(Arc::new(AuthenticatedRequestCoordinator::new(
            transport, store, options,
        ))))
    }

    pub fn coordinator(&self) -> &Arc<AuthenticatedRequestCoordinator> {
        &self.coordinator
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.coordinator)
    }

    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(&self.coordinator)
    }

    pub fn cards(&self) -> CardApi<'_> {
        CardApi::new(&self.coordinator)
    }

    pub fn public(&self) -> PublicCardApi<'_> {
        PublicCardApi::new(&self.coordinator)
    }
}

/// Decode a response body into `T`, naming the endpoint on failure.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    path: &str,
    body: serde_json::Value,
) -> Result<T, NamecardError> {
    serde_json::from_value(body).map_err(|e| {
        NamecardError::ProtocolError(format!("Unexpected response body from {path}: {e}"))
    })
}

/// Percent-encode a value used as a single path segment.
pub(crate) fn path_segment(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(b as char);
            }
            _ => result.push_str(&format!("%{b:02X}")),
        }
    }
    result
}
