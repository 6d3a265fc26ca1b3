//! # Session Persistence
//!
//! Keeps the login token at `~/.postboard/session.json` so it survives
//! restarts. Writes use atomic rename (write `.tmp`, then `rename()`) for
//! crash safety.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::api::{SessionStore, User};

/// What is stored on disk.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionData {
    pub token: String,
    pub user: User,
    pub saved_at: i64,
}

/// Returns `~/.postboard/session.json`.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".postboard").join("session.json"))
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_session(path: &Path) -> io::Result<Option<SessionData>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Session store backed by a JSON file, with an in-memory copy so requests
/// don't hit the disk.
pub struct FileSessionStore {
    path: PathBuf,
    current: RwLock<Option<SessionData>>,
}

impl FileSessionStore {
    /// Opens the store at `path`. A missing or unreadable file means logged
    /// out.
    pub fn open(path: PathBuf) -> Self {
        let current = match read_session(&path) {
            Ok(data) => data,
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                None
            }
        };
        debug!(
            "Session store at {} ({})",
            path.display(),
            if current.is_some() { "logged in" } else { "logged out" }
        );
        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logged-in user, if any.
    pub fn user(&self) -> Option<User> {
        self.current
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|d| d.user.clone()))
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        self.current
            .read()
            .ok()
            .and_then(|s| s.as_ref().map(|d| d.token.clone()))
    }

    fn save(&self, token: &str, user: &User) -> io::Result<()> {
        let data = SessionData {
            token: token.to_string(),
            user: user.clone(),
            saved_at: Utc::now().timestamp(),
        };
        atomic_write_json(&self.path, &data)?;
        if let Ok(mut current) = self.current.write() {
            *current = Some(data);
        }
        debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        if self.path.exists()
            && let Err(e) = fs::remove_file(&self.path)
        {
            warn!("Failed to remove session file {}: {}", self.path.display(), e);
        }
    }
}
