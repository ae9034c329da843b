use reqwest::Method;
use skyway_core::user::{AuthResponse, LoginRequest, RegisterRequest};
use skyway_core::User;
use skyway_shared::Masked;
use tracing::{info, warn};

use crate::client::{ApiClient, Auth};
use crate::error::ApiResult;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and persist the session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: Masked::from(password),
        };
        let auth: AuthResponse = self
            .client
            .call(Method::POST, "auth/login", Auth::Anonymous, &body, "Login failed")
            .await?;
        self.client.start_session(auth).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
        let auth: AuthResponse = self
            .client
            .call(Method::POST, "auth/register", Auth::Anonymous, request, "Registration failed")
            .await?;
        self.client.start_session(auth).await
    }

    /// Local state is cleared before the server is told, so a failed
    /// `auth/logout` never leaves the user signed in.
    pub async fn logout(&self) -> ApiResult<()> {
        self.client.end_session().await?;
        info!("Signed out");
        if let Err(e) = self.client.post_anonymous("auth/logout", "Logout failed").await {
            warn!("Server-side logout failed: {}", e);
        }
        Ok(())
    }

    pub async fn is_authenticated(&self) -> ApiResult<bool> {
        Ok(self.client.session().await?.is_some())
    }
}
