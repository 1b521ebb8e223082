//! Authenticated HTTP calls against the task.io API gateway.
//!
//! ARCHITECTURE
//! ============
//! `fetch` probes `/api/v1/auth/me` before every request. A 401 from the
//! probe triggers exactly one `POST /api/v1/auth/refresh`, which relies on
//! the `refresh_token` cookie held by the client's cookie jar rather than
//! the token stored in `SessionState`. A client built with `for_session`
//! seeds that cookie from the stored refresh token, so a hydrated session
//! can refresh and log out from a new process. The real request is sent with
//! the latest bearer token and returned as-is, error statuses included.
//!
//! Only two outcomes are terminal for a call: the refresh endpoint rejecting
//! the cookie (`RefreshExpired`, session cleared) and a refresh that yields
//! no usable token (`ReauthFailed`, session kept): either the body lacks an
//! access token or the new token still fails the probe. Both emit
//! `AuthEvent::NeedLogin`.
//!
//! TRADE-OFFS
//! ==========
//! `fetch` borrows the session mutably, so calls on one session run one at a
//! time. Separate sessions refresh independently; there is no coalescing.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::{AuthEvent, AuthEvents};
use crate::session::SessionState;

pub const ME_PATH: &str = "/api/v1/auth/me";
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";
pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub const REFRESH_COOKIE: &str = "refresh_token";

const JSON: &str = "application/json";

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

/// Identity returned by `GET /api/v1/auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CurrentUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub img_url: String,
}

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Caller-controlled parts of a request passed to [`ApiClient::fetch`].
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    /// Add a header, replacing any earlier value under the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidHeader`] for malformed names or values.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, ClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    /// Serialize `value` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Parse`] if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_vec(value)?);
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        Ok(self)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: String,
    events: AuthEvents,
}

impl ApiClient {
    /// Build a client with its own cookie jar.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs));
        if let Some(secs) = config.timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;
        Ok(Self { http, jar, base_url: config.base_url.clone(), events: AuthEvents::new() })
    }

    /// Build a client for an existing session. A stored refresh token is
    /// placed in the cookie jar so refresh and logout work in a new process.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// does not parse.
    pub fn for_session(config: &ClientConfig, session: &SessionState) -> Result<Self, ClientError> {
        let client = Self::new(config)?;
        if let Some(token) = session.refresh_token() {
            client.seed_refresh_cookie(token)?;
        }
        Ok(client)
    }

    /// Put `refresh_token=<token>` into the cookie jar for the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the base URL does not parse.
    pub fn seed_refresh_cookie(&self, token: &str) -> Result<(), ClientError> {
        let url = reqwest::Url::parse(&format!("{}/", self.base_url))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        self.jar.add_cookie_str(&format!("{REFRESH_COOKIE}={token}; Path=/"), &url);
        tracing::debug!("seeded refresh cookie from stored session");
        Ok(())
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// Shorthand for `events().subscribe()`.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Send an authenticated request to `path`, refreshing the access token
    /// once if the identity probe rejects it.
    ///
    /// # Errors
    ///
    /// - [`ClientError::RefreshExpired`] when the refresh endpoint rejects
    ///   the cookie; the session's tokens and user info are cleared.
    /// - [`ClientError::ReauthFailed`] when the refresh response has no
    ///   access token or the refreshed token is still rejected.
    /// - [`ClientError::Http`] on transport failures.
    ///
    /// Error statuses on the real request are returned as `Ok(response)`.
    pub async fn fetch(
        &self,
        session: &mut SessionState,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        let status = self.probe(session).await?;
        if status == StatusCode::UNAUTHORIZED {
            tracing::info!("access token rejected; refreshing");
            self.refresh(session).await?;

            let status = self.probe(session).await?;
            if !status.is_success() {
                tracing::warn!(status = status.as_u16(), "refreshed token rejected");
                self.events.emit(AuthEvent::NeedLogin);
                return Err(ClientError::ReauthFailed);
            }
        }

        let url = self.url(path)?;
        let mut headers = options.headers;
        apply_bearer(&mut headers, session.access_token())?;
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        }

        let method = options.method;
        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        tracing::debug!(%method, path, status = response.status().as_u16(), "request complete");
        Ok(response)
    }

    /// Log in with email and password, then load the user's identity.
    ///
    /// The password is kept in memory on the session and never persisted.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] if the gateway rejects the
    /// credentials or the follow-up identity lookup fails.
    pub async fn login(
        &self,
        session: &mut SessionState,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, ClientError> {
        let response = self
            .http
            .post(self.url(LOGIN_PATH)?)
            .header(ACCEPT, JSON)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let tokens: TokenPair = read_json(response).await?;
        session.set_tokens(Some(tokens.access_token), Some(tokens.refresh_token));

        let user = self.me(session).await?;
        session.set_user_id(Some(user.user_id.clone()));
        session.set_user_info(
            Some(user.email.clone()),
            Some(password.to_owned()),
            Some(user.name.clone()),
            Some(user.surname.clone()),
            Some(user.img_url.clone()),
        );

        tracing::info!(user_id = %user.user_id, "logged in");
        Ok(user)
    }

    /// Fetch the identity behind the session's access token. No refresh is
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] for any non-success status.
    pub async fn me(&self, session: &SessionState) -> Result<CurrentUser, ClientError> {
        let response = self.identity_request(session)?.send().await?;
        read_json(response).await
    }

    /// Revoke the refresh cookie server-side and clear the session.
    ///
    /// The session is cleared even when the gateway call fails.
    ///
    /// # Errors
    ///
    /// Returns transport errors or [`ClientError::Status`] from the gateway.
    pub async fn logout(&self, session: &mut SessionState) -> Result<String, ClientError> {
        let sent = self.http.post(self.url(LOGOUT_PATH)?).header(ACCEPT, JSON).send().await;
        session.clear();
        let body: MessageResponse = read_json(sent?).await?;
        tracing::info!("logged out");
        Ok(body.message)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn probe(&self, session: &SessionState) -> Result<StatusCode, ClientError> {
        let response = self.identity_request(session)?.send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "identity probe");
        Ok(status)
    }

    fn identity_request(&self, session: &SessionState) -> Result<reqwest::RequestBuilder, ClientError> {
        let mut headers = HeaderMap::new();
        apply_bearer(&mut headers, session.access_token())?;
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        Ok(self.http.get(self.url(ME_PATH)?).headers(headers))
    }

    async fn refresh(&self, session: &mut SessionState) -> Result<(), ClientError> {
        let response = self.http.post(self.url(REFRESH_PATH)?).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "refresh rejected; clearing session");
            session.clear();
            self.events.emit(AuthEvent::NeedLogin);
            return Err(ClientError::RefreshExpired);
        }

        let text = response.text().await?;
        let body = match serde_json::from_str::<RefreshResponse>(&text) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "refresh response carried no access token");
                self.events.emit(AuthEvent::NeedLogin);
                return Err(ClientError::ReauthFailed);
            }
        };
        if body.refresh_token.is_some() {
            tracing::debug!("ignoring refresh token returned by refresh endpoint");
        }

        let refresh_token = session.refresh_token().map(ToOwned::to_owned);
        session.set_tokens(Some(body.access_token), refresh_token);
        Ok(())
    }

    fn url(&self, path: &str) -> Result<String, ClientError> {
        if path.contains("://") {
            return Err(ClientError::InvalidUrl(format!("expected a path, got '{path}'")));
        }
        if path.starts_with('/') {
            Ok(format!("{}{path}", self.base_url))
        } else {
            Ok(format!("{}/{path}", self.base_url))
        }
    }
}

/// Set `Authorization: Bearer <token>`, or drop the header when there is no
/// token.
fn apply_bearer(headers: &mut HeaderMap, token: Option<&str>) -> Result<(), ClientError> {
    match token {
        Some(token) => {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        None => {
            headers.remove(AUTHORIZATION);
        }
    }
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    if !(200..300).contains(&status) {
        return Err(ClientError::Status { status, body: text });
    }
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
