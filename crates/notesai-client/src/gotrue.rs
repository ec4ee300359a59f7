//! GoTrue-compatible identity service client.
//!
//! Talks to the password-grant REST API, keeps the current session in memory
//! and announces every session change on an [`AuthEventBus`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use notesai_core::{
    AuthEvent, AuthEventBus, AuthEventReceiver, Error, Identity, IdentityService, Result, Session,
};

/// Default GoTrue endpoint for local development.
pub const DEFAULT_GOTRUE_URL: &str = "http://localhost:9999";

/// Default timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sessions this close to expiry are refreshed before being handed out.
const REFRESH_MARGIN_SECS: i64 = 10;

/// Configuration for the GoTrue client.
#[derive(Debug, Clone)]
pub struct GoTrueConfig {
    /// Base URL of the auth API (e.g. `https://<project>.supabase.co/auth/v1`).
    pub url: String,
    /// Public API key sent as `apikey` on every request.
    pub anon_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GoTrueConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GOTRUE_URL.to_string(),
            anon_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GoTrueConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("GOTRUE_URL").unwrap_or_else(|_| DEFAULT_GOTRUE_URL.to_string()),
            anon_key: std::env::var("GOTRUE_ANON_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            timeout_seconds: std::env::var("GOTRUE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Serialize)]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserResponse> for Identity {
    fn from(user: UserResponse) -> Self {
        Identity {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .or_else(|| {
                self.expires_in
                    .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
            });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

/// `/signup` answers with a full session when email confirmation is off,
/// and with just the user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(UserResponse),
}

/// GoTrue reports errors in a few different shapes across versions.
#[derive(Debug, Default, Deserialize)]
struct GoTrueErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GoTrueErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Identity service backed by a GoTrue-compatible auth server.
pub struct GoTrueClient {
    client: Client,
    config: GoTrueConfig,
    session: RwLock<Option<Session>>,
    events: AuthEventBus,
}

impl GoTrueClient {
    pub fn new(config: GoTrueConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "client",
            component = "gotrue",
            url = %config.url,
            "Initializing GoTrue client"
        );

        Ok(Self {
            client,
            config,
            session: RwLock::new(None),
            events: AuthEventBus::default(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GoTrueConfig::from_env())
    }

    pub fn config(&self) -> &GoTrueConfig {
        &self.config
    }

    /// Adopt a session persisted elsewhere (e.g. by a previous run).
    pub async fn restore_session(&self, session: Session) {
        *self.session.write().await = Some(session.clone());
        self.events.emit(AuthEvent::SignedIn(session));
    }

    fn build_request(&self, endpoint: &str, bearer: Option<&str>) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref key) = self.config.anon_key {
            req = req.header("apikey", key);
        }

        match (bearer, &self.config.anon_key) {
            (Some(token), _) => req = req.header("Authorization", format!("Bearer {}", token)),
            (None, Some(key)) => req = req.header("Authorization", format!("Bearer {}", key)),
            (None, None) => {}
        }

        req.header("Content-Type", "application/json")
    }

    /// Turn a non-success response into an `Auth` error.
    async fn auth_error(op: &'static str, response: reqwest::Response) -> Error {
        let status = response.status();
        let body: GoTrueErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .into_message()
            .unwrap_or_else(|| format!("Identity service returned {}", status));
        warn!(
            subsystem = "client",
            component = "gotrue",
            op,
            status = status.as_u16(),
            error = %message,
            "Identity service rejected request"
        );
        Error::Auth(message)
    }

    async fn token_request<T: Serialize + ?Sized>(
        &self,
        op: &'static str,
        grant_type: &str,
        body: &T,
    ) -> Result<Session> {
        let response = self
            .build_request(&format!("/token?grant_type={}", grant_type), None)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(op, response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Failed to parse session: {}", e)))?;
        Ok(token.into_session())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session> {
        debug!(subsystem = "client", component = "gotrue", "Refreshing session");
        let session = self
            .token_request(
                "refresh",
                "refresh_token",
                &RefreshRequest { refresh_token },
            )
            .await?;
        *self.session.write().await = Some(session.clone());
        self.events.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }
}

fn needs_refresh(expires_at: Option<DateTime<Utc>>) -> bool {
    expires_at.is_some_and(|at| at <= Utc::now() + chrono::Duration::seconds(REFRESH_MARGIN_SECS))
}

#[async_trait]
impl IdentityService for GoTrueClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .token_request("sign_in", "password", &PasswordRequest { email, password })
            .await?;
        info!(
            subsystem = "client",
            component = "gotrue",
            owner_id = %session.user.id,
            "Signed in"
        );
        *self.session.write().await = Some(session.clone());
        self.events.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let response = self
            .build_request("/signup", None)
            .json(&PasswordRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error("sign_up", response).await);
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("Failed to parse sign-up response: {}", e)))?;

        match body {
            SignUpResponse::Session(token) => {
                let session = token.into_session();
                info!(
                    subsystem = "client",
                    component = "gotrue",
                    owner_id = %session.user.id,
                    "Signed up and signed in"
                );
                *self.session.write().await = Some(session.clone());
                self.events.emit(AuthEvent::SignedIn(session.clone()));
                Ok(Some(session))
            }
            SignUpResponse::User(user) => {
                info!(
                    subsystem = "client",
                    component = "gotrue",
                    owner_id = %user.id,
                    "Signed up; confirmation pending"
                );
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone());

        if let Some(token) = token {
            let response = self
                .build_request("/logout", Some(&token))
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(Self::auth_error("sign_out", response).await);
            }
        }

        *self.session.write().await = None;
        self.events.emit(AuthEvent::SignedOut);
        info!(subsystem = "client", component = "gotrue", "Signed out");
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>> {
        let current = self.session.read().await.clone();
        let Some(session) = current else {
            return Ok(None);
        };
        if !needs_refresh(session.expires_at) {
            return Ok(Some(session));
        }

        match session.refresh_token.as_deref() {
            Some(refresh_token) => match self.refresh(refresh_token).await {
                Ok(refreshed) => Ok(Some(refreshed)),
                Err(e) => {
                    *self.session.write().await = None;
                    self.events.emit(AuthEvent::SignedOut);
                    Err(e)
                }
            },
            None => {
                *self.session.write().await = None;
                self.events.emit(AuthEvent::SignedOut);
                Ok(None)
            }
        }
    }

    fn subscribe(&self) -> AuthEventReceiver {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GoTrueConfig::default();
        assert_eq!(config.url, DEFAULT_GOTRUE_URL);
        assert!(config.anon_key.is_none());
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_token_response_prefers_expires_at() {
        let json = r#"{
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "expires_at": 1900000000,
            "user": {"id": "00000000-0000-0000-0000-000000000001", "email": "a@b.c"}
        }"#;
        let session = serde_json::from_str::<TokenResponse>(json)
            .unwrap()
            .into_session();
        assert_eq!(session.expires_at.unwrap().timestamp(), 1_900_000_000);
        assert_eq!(session.user.email, "a@b.c");
        assert_eq!(session.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn test_signup_response_without_token_is_user() {
        let json = r#"{"id": "00000000-0000-0000-0000-000000000002", "email": "new@b.c"}"#;
        let body: SignUpResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(body, SignUpResponse::User(_)));
    }

    #[test]
    fn test_error_body_shapes() {
        let a: GoTrueErrorBody =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .unwrap();
        assert_eq!(a.into_message().as_deref(), Some("Invalid login credentials"));

        let b: GoTrueErrorBody =
            serde_json::from_str(r#"{"code":422,"msg":"User already registered"}"#).unwrap();
        assert_eq!(b.into_message().as_deref(), Some("User already registered"));
    }

    #[test]
    fn test_needs_refresh() {
        assert!(!needs_refresh(None));
        assert!(needs_refresh(Some(Utc::now())));
        assert!(!needs_refresh(Some(Utc::now() + chrono::Duration::hours(1))));
    }
}
