use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// How requests identify the caller.
///
/// Both schemes exist in deployed backends and are not interchangeable, so the
/// choice is made per deployment.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `user-id: <user_id>` taken from the stored user.
    UserId,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub socket: SocketConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub prefix: String,
    pub auth_scheme: AuthScheme,
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// `http://host:8000` + `/api/v1`, without a trailing slash.
    pub fn root_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.prefix.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SocketConfig {
    pub url: String,
    pub reconnect_attempts: u32,
    pub reconnect_delay_ms: u64,
}

impl SocketConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub path: PathBuf,
    pub user_cache_ttl_secs: u64,
}

impl SessionConfig {
    pub fn user_cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.user_cache_ttl_secs as i64)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults()?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // SKYWAY_API__BASE_URL=https://... sets api.base_url
            .add_source(
                config::Environment::with_prefix("SKYWAY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Defaults overlaid with a TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
        Self::defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.prefix", "/api/v1")?
            .set_default("api.auth_scheme", "bearer")?
            .set_default("api.timeout_secs", 30_i64)?
            .set_default("socket.url", "ws://localhost:5001")?
            .set_default("socket.reconnect_attempts", 5_i64)?
            .set_default("socket.reconnect_delay_ms", 1000_i64)?
            .set_default("session.path", ".skyway/session.json")?
            .set_default("session.user_cache_ttl_secs", 300_i64)
    }
}
