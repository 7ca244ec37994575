//! Token persistence
//!
//! The session keeps its token behind the [`TokenCache`] trait so the
//! storage medium is swappable: a file on disk for real use, plain memory
//! for tests.

use crate::error::ClientError;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Storage for the session token
///
/// A cache holds at most one token. `load` answers `None` when nothing is
/// stored, and `clear` on an empty cache is a no-op.
pub trait TokenCache: Send + Sync {
    /// Returns the cached token, if any
    fn load(&self) -> Result<Option<String>, ClientError>;

    /// Persists a token, replacing any previous one
    fn store(&self, token: &str) -> Result<(), ClientError>;

    /// Removes the cached token
    fn clear(&self) -> Result<(), ClientError>;
}

/// Token cache backed by a single file
///
/// The file holds the bare secret and nothing else. A missing file is an
/// empty cache, so first runs need no setup.
pub struct FileTokenCache {
    path: PathBuf,
}

impl FileTokenCache {
    /// Creates a cache over the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenCache for FileTokenCache {
    fn load(&self) -> Result<Option<String>, ClientError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Token cache held in memory, for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryTokenCache {
    token: Mutex<Option<String>>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenCache for MemoryTokenCache {
    fn load(&self) -> Result<Option<String>, ClientError> {
        let guard = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn store(&self, token: &str) -> Result<(), ClientError> {
        let mut guard = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        Ok(())
    }
}
