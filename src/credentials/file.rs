use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::NamecardError;

use super::store::{CredentialStore, Credentials};

pub fn session_path(profile: &str) -> PathBuf {
    let base = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".namecard")
        .join(profile);
    base.join("session.json")
}

/// Credential store persisted to a JSON session file.
///
/// The file is read once on open. Writes update memory first and then the
/// file; a failed write is logged and the in-memory pair stays current.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    current: RwLock<Option<Credentials>>,
}

impl FileCredentialStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = load_session(&path);
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn for_profile(profile: &str) -> Self {
        Self::open(session_path(profile))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<Credentials> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credentials: Credentials) {
        if let Err(e) = save_session(&self.path, &credentials) {
            tracing::warn!(path = %self.path.display(), "Failed to persist session: {e}");
        }
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
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Failed to remove session file: {e}")
            }
        }
    }
}

fn load_session(path: &Path) -> Option<Credentials> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            tracing::debug!(path = %path.display(), "Ignoring unreadable session file: {e}");
            None
        }
    }
}

fn save_session(path: &Path, credentials: &Credentials) -> Result<(), NamecardError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(credentials)
        .map_err(|e| NamecardError::ProtocolError(format!("Failed to serialize session: {e}")))?;
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_path_structure() {
        let path = session_path("staging");
        let path_str = path.to_string_lossy();
        assert!(path_str.contains(".namecard"));
        assert!(path_str.contains("staging"));
        assert!(path_str.ends_with("session.json"));
    }

    #[test]
    fn session_path_differs_per_profile() {
        assert_ne!(session_path("a"), session_path("b"));
    }

    #[test]
    fn open_missing_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::open(dir.path().join("session.json"));
        assert!(store.get().is_none());
    }

    #[test]
    fn set_persists_and_reopen_restores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileCredentialStore::open(&path);
        store.set(Credentials::new("A1", "R1"));
        assert!(path.exists());

        let reopened = FileCredentialStore::open(&path);
        assert_eq!(reopened.get(), Some(Credentials::new("A1", "R1")));
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileCredentialStore::open(&path);
        store.set(Credentials::new("A1", "R1"));

        store.clear();
        assert!(store.get().is_none());
        assert!(!path.exists());

        // clearing twice is fine
        store.clear();
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileCredentialStore::open(&path);
        assert!(store.get().is_none());
    }
}
