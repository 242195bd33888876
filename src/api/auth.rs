use crate::coordinator::AuthenticatedRequestCoordinator;
use crate::credentials::Credentials;
use crate::error::NamecardError;
use crate::transport::ApiRequest;
use crate::types::{AuthResponse, LoginRequest, RegisterRequest};

use super::decode;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Session lifecycle: login, registration and logout.
#[derive(Debug)]
pub struct AuthApi<'a> {
    coordinator: &'a AuthenticatedRequestCoordinator,
}

impl<'a> AuthApi<'a> {
    pub fn new(coordinator: &'a AuthenticatedRequestCoordinator) -> Self {
        Self { coordinator }
    }

    /// Log in and store the returned credentials. Returns the user's roles.
    pub async fn login(&self, request: &LoginRequest) -> Result<Vec<String>, NamecardError> {
        if request.email.is_none() && request.user_name.is_none() {
            return Err(NamecardError::InvalidArgument(
                "login needs an email or a user name".to_string(),
            ));
        }
        let body = self
            .coordinator
            .send_unauthenticated(ApiRequest::post(LOGIN_PATH).json(to_body(request)?))
            .await?;
        let response: AuthResponse = decode(LOGIN_PATH, body)?;

        let credentials = Credentials::new(response.data.access_token, response.data.refresh_token);
        let roles = match response.data.exist_user {
            Some(user) if !user.roles.is_empty() => user.roles,
            _ => credentials.roles(),
        };
        self.coordinator.store().set(credentials);
        tracing::debug!(?roles, "logged in");
        Ok(roles)
    }

    /// Register a new account. The session is not started; log in afterwards.
    pub async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value, NamecardError> {
        self.coordinator
            .send_unauthenticated(ApiRequest::post(REGISTER_PATH).json(to_body(request)?))
            .await
    }

    /// End the session on the server and forget local credentials.
    ///
    /// Local credentials are cleared even when the server call fails.
    pub async fn logout(&self) -> Result<(), NamecardError> {
        if !self.coordinator.store().is_authenticated() {
            return Ok(());
        }
        if let Err(e) = self.coordinator.send(ApiRequest::post(LOGOUT_PATH)).await {
            tracing::warn!("Server-side logout failed: {e}");
        }
        self.coordinator.store().clear();
        Ok(())
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, NamecardError> {
    serde_json::to_value(value)
        .map_err(|e| NamecardError::ProtocolError(format!("Failed to serialize request: {e}")))
}
