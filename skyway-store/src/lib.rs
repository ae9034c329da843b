pub mod app_config;
pub mod session;
pub mod user_cache;

pub use app_config::{AuthScheme, Config};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use user_cache::UserCache;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
