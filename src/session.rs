//! Bearer token persistence.
//!
//! The token survives restarts as plain text in a single file. An absent or
//! empty file means the user is logged out.
//!
use std::path::{Path, PathBuf};

use crate::error::{Context, Result};

/// Durable storage for the bearer token.
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, token: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Token kept in one plain-text file.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() { None } else { Some(token.to_string()) }
    }

    fn save(&mut self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_ctx(|| format!("create token directory {}", dir.display()))?;
        }
        std::fs::write(&self.path, token)
            .with_ctx(|| format!("write token file {}", self.path.display()))
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_ctx(|| format!("remove token file {}", self.path.display())),
        }
    }
}

/// In-process store; nothing touches disk.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    pub token: Option<String>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self { token: Some(token.to_string()) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.clone().filter(|t| !t.is_empty())
    }

    fn save(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.token = None;
        Ok(())
    }
}

/// In-memory view of the login state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// Read the persisted token once.
    pub fn restore(store: &dyn TokenStore) -> Self {
        Self { token: store.load() }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn set(&mut self, token: String) {
        self.token = if token.is_empty() { None } else { Some(token) };
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}
