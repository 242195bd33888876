pub mod http_mock;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use namecard::config::{Profile, ProfileConfig};
use namecard::credentials::{CredentialStore, Credentials, MemoryCredentialStore};
use namecard::NamecardClient;

/// A profile pointing at a mock server. Mock servers speak plain HTTP.
#[allow(dead_code)]
pub fn test_profile(base_url: &str, session_file: &Path) -> Profile {
    let cfg = ProfileConfig {
        base_url: Some(base_url.to_string()),
        allow_http: Some(true),
        refresh_timeout_ms: Some(2_000),
        session_file: Some(session_file.to_string_lossy().into_owned()),
        ..ProfileConfig::default()
    };
    Profile::from_config("test", &cfg).unwrap()
}

/// Client backed by an in-memory store, optionally pre-loaded with a session.
#[allow(dead_code)]
pub fn memory_client(
    base_url: &str,
    session: Option<(&str, &str)>,
) -> (NamecardClient, Arc<MemoryCredentialStore>) {
    let store = Arc::new(match session {
        Some((access, refresh)) => {
            MemoryCredentialStore::with_credentials(Credentials::new(access, refresh))
        }
        None => MemoryCredentialStore::new(),
    });
    let profile = test_profile(base_url, Path::new("/unused/session.json"));
    let client =
        NamecardClient::from_profile(&profile, store.clone() as Arc<dyn CredentialStore>).unwrap();
    (client, store)
}

/// Write a config with a single default profile named `test`.
#[allow(dead_code)]
pub fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    let config = serde_json::json!({
        "defaultProfile": "test",
        "profiles": {
            "test": {
                "baseUrl": base_url,
                "allowHttp": true,
                "refreshTimeoutMs": 2000,
                "sessionFile": dir.join("session.json"),
            }
        }
    });
    let path = dir.join("namecard.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

#[allow(dead_code)]
pub fn write_session(dir: &Path, access: &str, refresh: &str) {
    let session = serde_json::json!({ "accessToken": access, "refreshToken": refresh });
    std::fs::write(dir.join("session.json"), session.to_string()).unwrap();
}

/// Unsigned JWT carrying the given claims.
#[allow(dead_code)]
pub fn jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{body}.sig")
}
