use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use skyway_core::access::LOGIN_PATH;
use skyway_core::user::AuthResponse;
use skyway_core::User;
use skyway_store::app_config::ApiConfig;
use skyway_store::{AuthScheme, Session, SessionStore, UserCache};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::{server_message, ApiError, ApiResult};
use crate::{
    AirlinesApi, AirportsApi, AuthApi, BookingsApi, FlightsApi, RatingsApi, ReportsApi, UsersApi,
};

pub const USER_ID_HEADER: &str = "user-id";

/// Session lifecycle notifications for whoever owns navigation and the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(User),
    SignedOut,
    /// A request came back 401; stored credentials are already gone.
    Expired { redirect: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Required,
    Anonymous,
}

/// HTTP client for the platform's REST API.
///
/// Every authenticated call reads the current session from the store and
/// identifies itself with the configured scheme. A 401 on any authenticated
/// call wipes the session and user cache, broadcasts
/// [`SessionEvent::Expired`] and returns [`ApiError::SessionExpired`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    root: String,
    scheme: AuthScheme,
    sessions: Arc<dyn SessionStore>,
    user_cache: Arc<UserCache>,
    events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        sessions: Arc<dyn SessionStore>,
        user_cache: Arc<UserCache>,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        let (events, _) = broadcast::channel(100);
        Ok(Self {
            http,
            root: config.root_url(),
            scheme: config.auth_scheme,
            sessions,
            user_cache,
            events,
        })
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn flights(&self) -> FlightsApi<'_> {
        FlightsApi::new(self)
    }

    pub fn bookings(&self) -> BookingsApi<'_> {
        BookingsApi::new(self)
    }

    pub fn ratings(&self) -> RatingsApi<'_> {
        RatingsApi::new(self)
    }

    pub fn reports(&self) -> ReportsApi<'_> {
        ReportsApi::new(self)
    }

    pub fn airlines(&self) -> AirlinesApi<'_> {
        AirlinesApi::new(self)
    }

    pub fn airports(&self) -> AirportsApi<'_> {
        AirportsApi::new(self)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn root_url(&self) -> &str {
        &self.root
    }

    pub fn user_cache(&self) -> &UserCache {
        &self.user_cache
    }

    pub async fn session(&self) -> ApiResult<Option<Session>> {
        Ok(self.sessions.load().await?)
    }

    pub(crate) async fn require_session(&self) -> ApiResult<Session> {
        self.sessions.load().await?.ok_or(ApiError::NotAuthenticated)
    }

    pub(crate) async fn start_session(&self, auth: AuthResponse) -> ApiResult<User> {
        let session = Session {
            token: auth.token,
            user: auth.user,
        };
        self.sessions.save(&session).await?;
        self.user_cache.put(session.user.clone()).await;
        info!("Signed in as user {} ({})", session.user.user_id, session.user.role);
        let _ = self.events.send(SessionEvent::SignedIn(session.user.clone()));
        Ok(session.user)
    }

    pub(crate) async fn end_session(&self) -> ApiResult<()> {
        self.sessions.clear().await?;
        self.user_cache.invalidate().await;
        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }

    pub(crate) async fn store_user(&self, user: &User) -> ApiResult<()> {
        self.sessions.update_user(user).await?;
        self.user_cache.put(user.clone()).await;
        Ok(())
    }

    async fn expire_session(&self) {
        warn!("Received 401, clearing stored session");
        if let Err(e) = self.sessions.clear().await {
            warn!("Failed to clear session after 401: {}", e);
        }
        self.user_cache.invalidate().await;
        let _ = self.events.send(SessionEvent::Expired { redirect: LOGIN_PATH });
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.root, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str, auth: Auth) -> ApiResult<RequestBuilder> {
        let builder = self.http.request(method, self.url(path));
        if auth == Auth::Anonymous {
            return Ok(builder);
        }

        let session = self.require_session().await?;
        Ok(match self.scheme {
            AuthScheme::Bearer => builder.bearer_auth(session.token()),
            AuthScheme::UserId => builder.header(USER_ID_HEADER, session.user.user_id.to_string()),
        })
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        auth: Auth,
        fallback: &str,
    ) -> ApiResult<Response> {
        let request = builder.build()?;
        let (method, url) = (request.method().clone(), request.url().clone());
        debug!("{} {}", method, url);

        let response = self.http.execute(request).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Required {
            self.expire_session().await;
            return Err(ApiError::SessionExpired { redirect: LOGIN_PATH });
        }

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = server_message(&body).unwrap_or_else(|| fallback.to_string());
            warn!("{} {} failed with {}: {}", method, url.path(), status, message);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub(crate) async fn get<T>(&self, path: &str, fallback: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let builder = self.request(Method::GET, path, Auth::Required).await?;
        Self::decode(self.send(builder, Auth::Required, fallback).await?).await
    }

    pub(crate) async fn get_query<Q, T>(
        &self,
        path: &str,
        query: &Q,
        fallback: &str,
    ) -> ApiResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::GET, path, Auth::Required).await?.query(query);
        Self::decode(self.send(builder, Auth::Required, fallback).await?).await
    }

    /// JSON request, JSON response.
    pub(crate) async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        auth: Auth,
        body: &B,
        fallback: &str,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path, auth).await?.json(body);
        Self::decode(self.send(builder, auth, fallback).await?).await
    }

    /// JSON request, response body ignored.
    pub(crate) async fn call_unit<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.request(method, path, Auth::Required).await?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder, Auth::Required, fallback).await?;
        Ok(())
    }

    /// JSON request, raw response bytes.
    pub(crate) async fn call_bytes<B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ApiResult<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.request(method, path, Auth::Required).await?.json(body);
        let response = self.send(builder, Auth::Required, fallback).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub(crate) async fn delete(&self, path: &str, fallback: &str) -> ApiResult<()> {
        self.call_unit::<()>(Method::DELETE, path, None, fallback).await
    }

    /// Fire-and-forget style call without credentials.
    pub(crate) async fn post_anonymous(&self, path: &str, fallback: &str) -> ApiResult<()> {
        let builder = self.request(Method::POST, path, Auth::Anonymous).await?;
        self.send(builder, Auth::Anonymous, fallback).await?;
        Ok(())
    }
}
