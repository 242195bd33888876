use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coordinator::{DEFAULT_REFRESH_PATH, DEFAULT_REFRESH_TIMEOUT};
use crate::credentials::session_path;
use crate::error::NamecardError;

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamecardConfig {
    #[serde(default, rename = "defaultProfile", skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

/// One API environment as written in a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default, rename = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(default, rename = "refreshPath", skip_serializing_if = "Option::is_none")]
    pub refresh_path: Option<String>,
    #[serde(default, rename = "refreshTimeoutMs", skip_serializing_if = "Option::is_none")]
    pub refresh_timeout_ms: Option<u64>,
    #[serde(default, rename = "requestTimeoutMs", skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(default, rename = "authScheme", skip_serializing_if = "Option::is_none")]
    pub auth_scheme: Option<String>,
    #[serde(default, rename = "allowHttp", skip_serializing_if = "Option::is_none")]
    pub allow_http: Option<bool>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, rename = "sessionFile", skip_serializing_if = "Option::is_none")]
    pub session_file: Option<String>,
}

/// A profile with every default applied, ready to build a client from.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub base_url: String,
    pub refresh_path: String,
    pub refresh_timeout: Duration,
    pub request_timeout: Duration,
    pub auth_scheme: Option<String>,
    pub allow_http: bool,
    pub headers: HashMap<String, String>,
    pub session_file: PathBuf,
}

impl Profile {
    pub fn from_config(name: &str, cfg: &ProfileConfig) -> Result<Self, NamecardError> {
        let base_url = cfg
            .base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| NamecardError::ConfigError {
                path: PathBuf::from("<profile>"),
                detail: format!("Profile '{name}' has no 'baseUrl' configured"),
            })?;

        Ok(Self {
            name: name.to_string(),
            base_url,
            refresh_path: cfg
                .refresh_path
                .clone()
                .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string()),
            refresh_timeout: cfg
                .refresh_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REFRESH_TIMEOUT),
            request_timeout: cfg
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            auth_scheme: cfg.auth_scheme.clone().filter(|s| !s.is_empty()),
            allow_http: cfg.allow_http.unwrap_or(false),
            headers: cfg.headers.clone(),
            session_file: cfg
                .session_file
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| session_path(name)),
        })
    }
}

impl NamecardConfig {
    /// Name of the profile used when none is requested.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
    }

    /// Resolve a profile, falling back to `NAMECARD_BASE_URL` when it is not
    /// configured anywhere.
    pub fn resolve(&self, requested: Option<&str>) -> Result<Profile, NamecardError> {
        let adhoc = std::env::var("NAMECARD_BASE_URL").ok();
        self.resolve_with(requested, adhoc.as_deref())
    }

    pub fn resolve_with(
        &self,
        requested: Option<&str>,
        adhoc_base_url: Option<&str>,
    ) -> Result<Profile, NamecardError> {
        let name = self.profile_name(requested);
        if let Some(cfg) = self.profiles.get(name) {
            return Profile::from_config(name, cfg);
        }
        match adhoc_base_url.filter(|u| !u.trim().is_empty()) {
            Some(base_url) => {
                let cfg = ProfileConfig {
                    base_url: Some(base_url.to_string()),
                    allow_http: Some(base_url.starts_with("http://")),
                    ..ProfileConfig::default()
                };
                Profile::from_config(name, &cfg)
            }
            None => Err(NamecardError::ProfileNotFound(name.to_string())),
        }
    }
}
