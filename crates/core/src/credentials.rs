//! Credential pair persistence
//!
//! The stored session is owned exclusively by the request coordinator: it is
//! written at login, rewritten on refresh, and removed on logout or refresh
//! failure. Tokens are never logged in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::User;

/// Session file name inside the data directory
const SESSION_FILE: &str = "session.json";

/// Access/refresh token pair issued at login and rotated on refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential attached to API requests
    pub access: String,
    /// Long-lived credential used solely to obtain a new access token
    pub refresh: String,
}

/// Everything persisted for a logged-in session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// Account record returned at login, kept for offline `whoami`
    #[serde(default)]
    pub user: Option<User>,
}

impl StoredSession {
    /// Session holding only a token pair
    pub fn new(tokens: TokenPair) -> Self {
        Self { tokens, user: None }
    }
}

/// Storage seam for the credential pair
///
/// Implementations must make `clear` atomic with respect to `load`: a reader
/// sees either the full session or none of it.
pub trait CredentialStore: Send + Sync {
    /// Load the stored session, `None` when logged out
    fn load(&self) -> CoreResult<Option<StoredSession>>;

    /// Persist the session, replacing any previous one
    fn save(&self, session: &StoredSession) -> CoreResult<()>;

    /// Remove the session entirely
    fn clear(&self) -> CoreResult<()>;
}

/// File-backed store writing `session.json` under the app data directory
///
/// The file is written with 0600 permissions on unix. A missing file loads
/// as a logged-out state rather than an error.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store rooted at an explicit data directory
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SESSION_FILE),
        }
    }

    /// Store rooted at the platform data directory (`<data>/atelier`)
    pub fn default_location() -> CoreResult<Self> {
        let base = dirs::data_dir().ok_or(CoreError::NoDataDir)?;
        Ok(Self::new(base.join("atelier")))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_restricted(&self, contents: &str) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| CoreError::storage(format!("create {}: {e}", parent.display())))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .map_err(|e| CoreError::storage(format!("open {}: {e}", self.path.display())))?;
            file.write_all(contents.as_bytes())
                .map_err(|e| CoreError::storage(format!("write {}: {e}", self.path.display())))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .map_err(|e| CoreError::storage(format!("write {}: {e}", self.path.display())))?;
        }

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> CoreResult<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| CoreError::storage(format!("read {}: {e}", self.path.display())))?;
        let session = serde_json::from_str(&contents)
            .map_err(|e| CoreError::corrupt(format!("{}: {e}", self.path.display())))?;
        Ok(Some(session))
    }

    fn save(&self, session: &StoredSession) -> CoreResult<()> {
        let contents = serde_json::to_string_pretty(session)?;
        self.write_restricted(&contents)
    }

    fn clear(&self) -> CoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::storage(format!(
                "remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// In-memory store for tests and embedded use
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a session
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> CoreResult<Option<StoredSession>> {
        Ok(self.inner.lock().expect("credential store poisoned").clone())
    }

    fn save(&self, session: &StoredSession) -> CoreResult<()> {
        *self.inner.lock().expect("credential store poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> CoreResult<()> {
        *self.inner.lock().expect("credential store poisoned") = None;
        Ok(())
    }
}

/// Masked rendition of a token for logs (prefix only)
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 {
        return "***".to_string();
    }
    format!("{}...", &token[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access: "access-token-value".to_string(),
            refresh: "refresh-token-value".to_string(),
        }
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());

        assert!(store.load().unwrap().is_none());

        store.save(&StoredSession::new(pair())).unwrap();
        let loaded = store.load().unwrap().expect("session persisted");
        assert_eq!(loaded.tokens, pair());
        assert!(loaded.user.is_none());
    }

    #[test]
    fn file_store_clear_removes_both_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());

        store.save(&StoredSession::new(pair())).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert!(!store.path().exists());

        // clearing an already-empty store is not an error
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.save(&StoredSession::new(pair())).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(&StoredSession::new(pair())).unwrap();
        assert_eq!(store.load().unwrap().unwrap().tokens, pair());

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn tokens_are_masked_for_display() {
        assert_eq!(mask_token("a-very-long-bearer-token"), "a-very-l...");
        assert_eq!(mask_token("short"), "***");
    }
}
