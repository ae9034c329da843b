use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skyway_core::User;
use skyway_shared::Masked;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::StoreResult;

/// Credentials plus the last known profile of the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: Masked<String>,
    pub user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: Masked::new(token.into()),
            user,
        }
    }

    pub fn token(&self) -> &str {
        self.token.expose()
    }
}

/// Durable holder for the current session. At most one session exists.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> StoreResult<Option<Session>>;
    async fn save(&self, session: &Session) -> StoreResult<()>;
    /// Replace the stored profile, keeping the token. No-op when signed out.
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn clear(&self) -> StoreResult<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> StoreResult<Option<Session>> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, session: &Session) -> StoreResult<()> {
        *self.inner.write().await = Some(session.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        if let Some(session) = self.inner.write().await.as_mut() {
            session.user = user.clone();
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        *self.inner.write().await = None;
        Ok(())
    }
}

/// Session persisted as `{"token": ..., "user": {...}}` in a JSON file.
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

    async fn write(&self, session: &Session) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, body).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> StoreResult<Option<Session>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // An unreadable session counts as signed out.
                warn!("Discarding unreadable session file {}: {}", self.path.display(), e);
                self.clear().await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> StoreResult<()> {
        self.write(session).await?;
        info!("Session saved for user {}", session.user.user_id);
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        match self.load().await? {
            Some(mut session) => {
                session.user = user.clone();
                self.write(&session).await
            }
            None => Ok(()),
        }
    }

    async fn clear(&self) -> StoreResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
