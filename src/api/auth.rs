use std::io;
use std::sync::RwLock;

use super::types::User;

/// Supplies the bearer token for requests and tears the session down when
/// the server rejects it.
pub trait SessionStore: Send + Sync {
    /// Current token, if logged in.
    fn token(&self) -> Option<String>;

    /// Persists a token obtained from a successful login.
    fn save(&self, token: &str, user: &User) -> io::Result<()>;

    /// Forgets the current session.
    fn clear(&self);
}

/// Session held only in memory, e.g. a token passed through the environment.
#[derive(Default)]
pub struct StaticSession {
    token: RwLock<Option<String>>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }
}

impl SessionStore for StaticSession {
    fn token(&self) -> Option<String> {
        self.token.read().map(|t| t.clone()).unwrap_or_default()
    }

    fn save(&self, token: &str, _user: &User) -> io::Result<()> {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }
}
