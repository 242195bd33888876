use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::NamecardError;

/// The parts of an access token payload the client cares about.
///
/// Signatures are not verified; the server remains the only authority on
/// whether a token is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires) => Utc::now() >= expires,
            None => false,
        }
    }
}

pub fn decode_claims(token: &str) -> Result<TokenClaims, NamecardError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(NamecardError::ProtocolError(
                "Access token is not a JWT".to_string(),
            ))
        }
    };

    // Some issuers pad their segments even though JWTs should not.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| NamecardError::ProtocolError(format!("Invalid JWT payload encoding: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| NamecardError::ProtocolError(format!("Invalid JWT payload: {e}")))
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}
