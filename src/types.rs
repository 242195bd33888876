use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::DeviceInfo;
use crate::error::NamecardError;

/// Visual template a public card is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CardType {
    #[default]
    Minimal,
    Modern,
    Corporate,
}

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::Minimal, CardType::Modern, CardType::Corporate];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Minimal => "Minimal",
            CardType::Modern => "Modern",
            CardType::Corporate => "Corporate",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = NamecardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                NamecardError::InvalidArgument(format!(
                    "Unknown card type '{s}'. Expected one of: Minimal, Modern, Corporate"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    #[serde(default)]
    pub id: String,
    pub platform: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "idCard")]
    pub id_card: Vec<Card>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub web_site: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub qr_url: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub card_type: Option<CardType>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub theme_color: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "socialLinks")]
    pub social_links: Vec<SocialLink>,
    #[serde(default)]
    pub user: Option<Box<User>>,
}

impl Card {
    /// Cards saved without a template render as Minimal.
    pub fn template(&self) -> CardType {
        self.card_type.unwrap_or_default()
    }

    pub fn active_social_links(&self) -> impl Iterator<Item = &SocialLink> {
        self.social_links.iter().filter(|l| !l.is_deleted)
    }
}

/// `{ message, data }` wrapper around a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub data: User,
}

/// `{ message, card }` wrapper around a single card.
#[derive(Debug, Clone, Deserialize)]
pub struct CardEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub card: Card,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardList {
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// Public page data for a username: every card that user shares.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicCards {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub card: Vec<Card>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub platform: String,
    #[serde(default)]
    pub icon: String,
    pub url: String,
}

/// Body for creating or updating a card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPayload {
    #[serde(default)]
    pub card_type: CardType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub social: Vec<SocialInput>,
}

impl From<&Card> for CardPayload {
    fn from(card: &Card) -> Self {
        Self {
            card_type: card.template(),
            gender: card.gender,
            nationality: card.nationality.clone(),
            dob: card.dob.clone(),
            address: card.address.clone(),
            phone: card.phone.clone(),
            web_site: card.web_site.clone(),
            job: card.job.clone(),
            bio: card.bio.clone(),
            company: card.company.clone(),
            social: card
                .active_social_links()
                .map(|l| SocialInput {
                    id: Some(l.id.clone()).filter(|id| !id.is_empty()),
                    platform: l.platform.clone(),
                    icon: l.icon.clone(),
                    url: l.url.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub user_name: String,
    pub full_name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl RegisterRequest {
    pub fn with_device(mut self, device: &DeviceInfo) -> Self {
        self.device_name = Some(device.device_name.clone());
        self.device_type = Some(device.device_type.clone());
        self.os = Some(device.os.clone());
        self.browser = Some(device.browser.clone());
        self.device_model = Some(device.device_model.clone());
        self.fingerprint = Some(device.fingerprint.clone());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UpdateProfileRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub data: AuthData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(default, rename = "existUser")]
    pub exist_user: Option<ExistingUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExistingUser {
    #[serde(default)]
    pub roles: Vec<String>,
}
