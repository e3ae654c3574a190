//! File-backed credential store.
//!
//! The core only consumes stored credentials at session start; storage is a
//! collaborator concern and this keeps it to a plain JSON file under the
//! data directory. Protecting that file is left to filesystem permissions.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Stored portal credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub auto_login: bool,
}

/// Loads and saves credentials under a data directory.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("credentials.json"),
        }
    }

    pub fn has_saved(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Option<Credentials> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "stored credentials unreadable");
                None
            }
        }
    }

    pub fn save(&self, credentials: &Credentials) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, content)?;
        info!(username = %credentials.username, "credentials saved");
        Ok(())
    }

    pub fn delete(&self) -> std::io::Result<bool> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("stored credentials deleted");
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hiworks-cred-test-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_load_delete_roundtrip() {
        let dir = temp_dir("roundtrip");
        let store = CredentialStore::new(&dir);
        assert!(!store.has_saved());
        assert!(store.load().is_none());

        let credentials = Credentials {
            username: "user@acme.com".into(),
            password: "hunter2".into(),
            auto_login: true,
        };
        store.save(&credentials).unwrap();
        assert!(store.has_saved());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.username, "user@acme.com");
        assert!(loaded.auto_login);

        assert!(store.delete().unwrap());
        assert!(!store.has_saved());
        assert!(!store.delete().unwrap());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_loads_as_none() {
        let dir = temp_dir("corrupt");
        let store = CredentialStore::new(&dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("credentials.json"), "{not json").unwrap();
        assert!(store.load().is_none());
        let _ = fs::remove_dir_all(&dir);
    }
}
