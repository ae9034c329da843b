use chrono::{DateTime, Duration, Utc};
use skyway_core::User;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct CachedUser {
    user: User,
    fetched_at: DateTime<Utc>,
}

/// Short-lived copy of the current user's profile, so repeated lookups
/// don't each hit `users/{id}`.
#[derive(Debug)]
pub struct UserCache {
    ttl: Duration,
    entry: RwLock<Option<CachedUser>>,
}

impl UserCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub async fn get_fresh_at(&self, now: DateTime<Utc>) -> Option<User> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|cached| now - cached.fetched_at < self.ttl)
            .map(|cached| cached.user.clone())
    }

    pub async fn get_fresh(&self) -> Option<User> {
        self.get_fresh_at(Utc::now()).await
    }

    pub async fn put_at(&self, user: User, now: DateTime<Utc>) {
        *self.entry.write().await = Some(CachedUser {
            user,
            fetched_at: now,
        });
    }

    pub async fn put(&self, user: User) {
        self.put_at(user, Utc::now()).await
    }

    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }
}
