use crate::error::AppError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Durable home for the session's opaque cookie blob.
pub trait CookieStore: Send + Sync {
    /// Returns the last saved blob, `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<String>, AppError>;

    /// May block. The session manager calls it on the blocking thread pool.
    fn save(&self, blob: &str) -> Result<(), AppError>;
}

/// Keeps the blob in a file on disk.
#[derive(Debug, Clone)]
pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CookieStore for FileCookieStore {
    fn load(&self) -> Result<Option<String>, AppError> {
        if !self.path.exists() {
            debug!("Cookie file {} not found", self.path.display());
            return Ok(None);
        }
        let blob = fs::read_to_string(&self.path)?;
        Ok(Some(blob))
    }

    fn save(&self, blob: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Atomic replace.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Saved cookies to {}", self.path.display());
        Ok(())
    }
}

impl fmt::Display for FileCookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"path\":\"{}\"}}", self.path.display())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    blob: Mutex<Option<String>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|b| b.clone())
    }
}

impl CookieStore for MemoryCookieStore {
    fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.snapshot())
    }

    fn save(&self, blob: &str) -> Result<(), AppError> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|e| AppError::Io(format!("cookie store poisoned: {e}")))?;
        *guard = Some(blob.to_string());
        Ok(())
    }
}
