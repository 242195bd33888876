use std::sync::Arc;

use crate::api::NamecardClient;
use crate::config::{load_config, NamecardConfig, Profile};
use crate::credentials::{CredentialStore, FileCredentialStore};
use crate::error::NamecardError;

/// A resolved profile with its persisted credentials and a client bound to both.
#[derive(Debug)]
pub struct Session {
    pub profile: Profile,
    pub store: Arc<FileCredentialStore>,
    pub client: NamecardClient,
}

impl Session {
    pub fn open(cli_config: Option<&str>, profile: Option<&str>) -> Result<Self, NamecardError> {
        let config = load_config(cli_config)?;
        Self::from_config(&config, profile)
    }

    pub fn from_config(config: &NamecardConfig, profile: Option<&str>) -> Result<Self, NamecardError> {
        let profile = config.resolve(profile)?;
        let store = Arc::new(FileCredentialStore::open(profile.session_file.clone()));
        let client = NamecardClient::from_profile(&profile, store.clone() as Arc<dyn CredentialStore>)?;
        tracing::debug!(
            profile = %profile.name,
            base_url = %profile.base_url,
            session = %store.path().display(),
            "opened session"
        );
        Ok(Self {
            profile,
            store,
            client,
        })
    }

    pub fn require_login(&self) -> Result<(), NamecardError> {
        if self.store.is_authenticated() {
            Ok(())
        } else {
            Err(NamecardError::NotLoggedIn)
        }
    }
}
