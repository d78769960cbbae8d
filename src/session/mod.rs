// Session storage
// The wizard never acquires or refreshes tokens; it only reads whatever a
// prior sign-in left behind and attaches it as a bearer credential.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::logging::mask_sensitive;

/// Source of the bearer token attached to every backend request.
pub trait SessionStore: Send + Sync {
    /// Returns the current token, or None when no usable session exists.
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token for embedders and tests.
pub struct StaticSessionStore {
    token: Option<String>,
}

impl StaticSessionStore {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A store with no session at all.
    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

impl SessionStore for StaticSessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

#[derive(Debug, Deserialize)]
struct SessionFile {
    token: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

/// Reads the session left on disk by the sign-in flow.
///
/// The file is re-read on every request so an external refresh is picked up
/// without restarting. An unreadable, malformed, or expired session reads as
/// absent; the failure is logged (token masked) and never surfaced.
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

    fn read_session(&self) -> Option<SessionFile> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(
                    "[PHASE: initialization] [STEP: session] No session file at {:?}: {}",
                    self.path, e
                );
                return None;
            }
        };

        match serde_json::from_str::<SessionFile>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(
                    "[PHASE: initialization] [STEP: session] Malformed session file at {:?}: {}",
                    self.path, e
                );
                None
            }
        }
    }
}

impl SessionStore for FileSessionStore {
    fn bearer_token(&self) -> Option<String> {
        let session = self.read_session()?;

        if let Some(expires_at) = session.expires_at {
            if expires_at <= Utc::now() {
                warn!(
                    "[PHASE: initialization] [STEP: session] Session for user {:?} expired at {} (token {})",
                    session.user_id,
                    expires_at,
                    mask_sensitive(&session.token)
                );
                return None;
            }
        }

        Some(session.token)
    }
}
