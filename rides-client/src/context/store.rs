//! Session persistence between client runs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use rides::UserId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::auth::Session;

/// Session file contents
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<UserId>,
}

/// TOML file keeping the session token and the logged in user id
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restores the stored session
    ///
    /// Missing file means there is no session. File which cannot be parsed, or a token which
    /// cannot be decoded, is treated the same way.
    pub async fn load(&self) -> Result<Option<Session>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "No stored session");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let stored: StoredSession = match toml::from_str(&content) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(path = ?self.path, %err, "Ignoring malformed session file");
                return Ok(None);
            }
        };

        let session = Session::from_token(stored.token)
            .map(|session| session.with_user_id(stored.user_id));
        if session.is_none() {
            warn!(path = ?self.path, "Ignoring stored session with undecodable token");
        }

        Ok(session)
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        let stored = StoredSession {
            token: session.token().to_owned(),
            user_id: session.user_id(),
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, toml::to_string(&stored)?).await?;
        debug!(path = ?self.path, "Session stored");
        Ok(())
    }

    /// Removes the stored session, if any
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}
