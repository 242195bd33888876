use crate::coordinator::AuthenticatedRequestCoordinator;
use crate::error::NamecardError;
use crate::transport::ApiRequest;
use crate::types::{Card, CardEnvelope, CardPayload, PublicCards};

use super::{decode, path_segment};

pub const CREATE_CARD_PATH: &str = "/card/create-card";

#[derive(Debug)]
pub struct CardApi<'a> {
    coordinator: &'a AuthenticatedRequestCoordinator,
}

impl<'a> CardApi<'a> {
    pub fn new(coordinator: &'a AuthenticatedRequestCoordinator) -> Self {
        Self { coordinator }
    }

    pub async fn get(&self, id: &str) -> Result<Card, NamecardError> {
        let envelope: CardEnvelope = self
            .coordinator
            .send_json(ApiRequest::get(format!("/card/get-card/{}", path_segment(id))))
            .await?;
        Ok(envelope.card)
    }

    pub async fn create(&self, payload: &CardPayload) -> Result<Card, NamecardError> {
        let body = self
            .coordinator
            .send(ApiRequest::post(CREATE_CARD_PATH).json(payload_body(payload)?))
            .await?;
        let envelope: CardEnvelope = decode(CREATE_CARD_PATH, body)?;
        Ok(envelope.card)
    }

    pub async fn update(&self, id: &str, payload: &CardPayload) -> Result<Card, NamecardError> {
        let path = format!("/card/update-card/{}", path_segment(id));
        let body = self
            .coordinator
            .send(ApiRequest::put(path.clone()).json(payload_body(payload)?))
            .await?;
        let envelope: CardEnvelope = decode(&path, body)?;
        Ok(envelope.card)
    }
}

/// Cards shown on a user's public page. No session needed.
#[derive(Debug)]
pub struct PublicCardApi<'a> {
    coordinator: &'a AuthenticatedRequestCoordinator,
}

impl<'a> PublicCardApi<'a> {
    pub fn new(coordinator: &'a AuthenticatedRequestCoordinator) -> Self {
        Self { coordinator }
    }

    pub async fn by_username(&self, username: &str) -> Result<Vec<Card>, NamecardError> {
        if username.trim().is_empty() {
            return Err(NamecardError::InvalidArgument(
                "username must not be empty".to_string(),
            ));
        }
        let path = format!("/card/get-card-username/{}", path_segment(username.trim()));
        let body = self
            .coordinator
            .send_unauthenticated(ApiRequest::get(path.clone()))
            .await?;
        let cards: PublicCards = decode(&path, body)?;
        Ok(cards.card.into_iter().filter(|c| !c.is_deleted).collect())
    }
}

fn payload_body(payload: &CardPayload) -> Result<serde_json::Value, NamecardError> {
    serde_json::to_value(payload)
        .map_err(|e| NamecardError::ProtocolError(format!("Failed to serialize card: {e}")))
}
