use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::session::{SessionData, SessionStore};

use super::error::InfraError;

/// JSON file holding `{ "token": ..., "user": { ... } }`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionData>, InfraError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        // A file missing either the token or the user is treated as corrupt.
        serde_json::from_slice(&raw).map(Some).map_err(|err| {
            InfraError::session_store(format!("{}: {err}", self.path.display()))
        })
    }

    fn save(&self, data: &SessionData) -> Result<(), InfraError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(data)
            .map_err(|err| InfraError::session_store(err.to_string()))?;
        fs::write(&self.path, body)?;
        debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), InfraError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use noticeboard_api_types::User;
    use tempfile::tempdir;

    use super::*;

    fn data() -> SessionData {
        SessionData {
            token: "secret".into(),
            user: User {
                id: "u1".into(),
                email: "me@example.com".into(),
            },
        }
    }

    #[test]
    fn missing_file_means_no_session() {
        let dir = tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().expect("load"), None);
        store.clear().expect("clearing a missing file is fine");
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("nested/dir/session.json"));
        store.save(&data()).expect("save");
        assert_eq!(store.load().expect("load"), Some(data()));
        store.clear().expect("clear");
        assert!(!store.path().exists());
    }

    #[test]
    fn incomplete_file_is_reported_as_corrupt() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, br#"{"token":"only"}"#).expect("write");
        let err = FileSessionStore::new(path).load().expect_err("user missing");
        assert!(matches!(err, InfraError::SessionStore { .. }));
    }
}
