use skyway_core::CoreError;
use skyway_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },
    #[error("Session expired, please log in again")]
    SessionExpired { redirect: &'static str },
    #[error("User not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Validation(#[from] CoreError),
    #[error("Session storage error: {0}")]
    Store(#[from] StoreError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Text to show the user: the server's own message or validation text
    /// when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::SessionExpired { .. } | ApiError::NotAuthenticated => self.to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Where the shell should navigate, if anywhere.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            ApiError::SessionExpired { redirect } => Some(redirect),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::SessionExpired { .. } => Some(401),
            _ => None,
        }
    }
}

/// Pull `message` (or `error`) out of a JSON error body.
pub(crate) fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .into_iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
