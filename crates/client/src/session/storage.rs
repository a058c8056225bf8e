//! Durable token storage.
//!
//! The session keeps exactly one value across restarts: the bearer token,
//! stored under [`TOKEN_KEY`]. The profile is never persisted.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Key under which the token is stored.
pub const TOKEN_KEY: &str = "token";

/// Errors that can occur while reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("Session storage I/O error at {}: {source}", path.display())]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// Serializing the session file failed.
    #[error("Session storage encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("Session storage lock poisoned")]
    Poisoned,
}

/// Key-value storage that survives process restarts.
pub trait TokenStorage: Send + Sync {
    /// Read the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store exists but cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be written.
    fn store(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the stored token. Succeeds if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if an existing token cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// On-disk layout of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(flatten)]
    entries: HashMap<String, String>,
}

/// Token storage backed by a small JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Create storage at `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_file(&self) -> Result<SessionFile, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SessionFile::default()),
            Err(e) => return Err(self.io_error(e)),
        };

        match serde_json::from_str(&content) {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable session file"
                );
                Ok(SessionFile::default())
            }
        }
    }

    fn write_file(&self, file: &SessionFile) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let content = serde_json::to_string_pretty(file)?;
        write_private(&self.path, content.as_bytes()).map_err(|e| self.io_error(e))
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let mut file = self.read_file()?;
        Ok(file
            .entries
            .remove(TOKEN_KEY)
            .filter(|token| !token.is_empty()))
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        let mut file = self.read_file()?;
        file.entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
        self.write_file(&file)?;
        debug!(path = %self.path.display(), "Session token stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut file = self.read_file()?;
        if file.entries.remove(TOKEN_KEY).is_none() {
            return Ok(());
        }

        if file.entries.is_empty() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(self.io_error(e)),
            }
        } else {
            self.write_file(&file)?;
        }
        debug!(path = %self.path.display(), "Session token cleared");
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // The mode above only applies on creation.
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    std::fs::write(path, contents)
}

/// Token storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that already holds `token`, as if a previous run had
    /// logged in.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.lock() {
            entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
        }
        storage
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(TOKEN_KEY).cloned())
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(TOKEN_KEY);
        Ok(())
    }
}
