use crate::coordinator::AuthenticatedRequestCoordinator;
use crate::error::NamecardError;
use crate::transport::ApiRequest;
use crate::types::{Card, CardList, UpdateProfileRequest, User, UserEnvelope};

use super::decode;

pub const PROFILE_PATH: &str = "/user/me";
pub const CARDS_PATH: &str = "/card/get-cards";
pub const UPDATE_PROFILE_PATH: &str = "/user/update-profile";

#[derive(Debug)]
pub struct UserApi<'a> {
    coordinator: &'a AuthenticatedRequestCoordinator,
}

impl<'a> UserApi<'a> {
    pub fn new(coordinator: &'a AuthenticatedRequestCoordinator) -> Self {
        Self { coordinator }
    }

    pub async fn profile(&self) -> Result<User, NamecardError> {
        let envelope: UserEnvelope = self
            .coordinator
            .send_json(ApiRequest::get(PROFILE_PATH))
            .await?;
        Ok(envelope.data)
    }

    /// Cards owned by the logged-in user, excluding deleted ones.
    pub async fn cards(&self) -> Result<Vec<Card>, NamecardError> {
        let list: CardList = self
            .coordinator
            .send_json(ApiRequest::get(CARDS_PATH).query("is_deleted", "false"))
            .await?;
        Ok(list.cards)
    }

    pub async fn update_profile(&self, update: &UpdateProfileRequest) -> Result<User, NamecardError> {
        if update.is_empty() {
            return Err(NamecardError::InvalidArgument(
                "nothing to update".to_string(),
            ));
        }
        let body = serde_json::to_value(update)
            .map_err(|e| NamecardError::ProtocolError(format!("Failed to serialize request: {e}")))?;
        let response = self
            .coordinator
            .send(ApiRequest::put(UPDATE_PROFILE_PATH).json(body))
            .await?;
        let envelope: UserEnvelope = decode(UPDATE_PROFILE_PATH, response)?;
        Ok(envelope.data)
    }
}
