//! GoTrue auth client for Rust
//!
//! Sign in with a password or a one-time password, sign up, verify tokens,
//! fetch the current user and sign out. Sessions are not stored; callers keep
//! the returned access token and pass it back where needed.

use log::{error, warn};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub mod types;

pub use types::{
    AppMetadata, AuthDetailResp, GotrueMeta, Provider, SignInRequest, SignUpRequest, User,
    UserMeta, VerifyRequest, VerifyType,
};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("you must provide either an email or phone number")]
    EmailOrPhoneEmpty,

    #[error("password is required")]
    PasswordEmpty,

    #[error("API error: {message} (Status: {status})")]
    ApiError { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AuthError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AuthError::ApiError { status, .. } => Some(*status),
            AuthError::NetworkError(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Client for `https://<ref>.supabase.co/auth/v1`.
#[derive(Debug, Clone)]
pub struct Auth {
    api_key: String,
    auth_url: String,
    http_client: Client,
}

impl Auth {
    pub fn new(api_key: &str, auth_url: &str, http_client: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn url(&self) -> &str {
        &self.auth_url
    }

    /// Send a magic link or SMS code.
    pub async fn sign_in_with_otp(
        &self,
        body: SignInRequest,
        redirect_url: Option<&str>,
    ) -> Result<()> {
        if !body.has_identity() {
            return Err(AuthError::EmailOrPhoneEmpty);
        }
        let mut url = format!("{}/otp", self.auth_url);
        if let Some(redirect) = redirect_url.filter(|r| !r.is_empty()) {
            url.push_str("?redirect_to=");
            url.push_str(&urlencoding::encode(redirect));
        }
        self.send(Method::POST, &url, None, Some(&body), "sign in with otp")
            .await
            .map(|_| ())
    }

    pub async fn sign_in_with_password(&self, body: SignInRequest) -> Result<AuthDetailResp> {
        if !body.has_identity() {
            return Err(AuthError::EmailOrPhoneEmpty);
        }
        if !body.has_password() {
            return Err(AuthError::PasswordEmpty);
        }
        let url = format!("{}/token?grant_type=password", self.auth_url);
        let bytes = self
            .send(Method::POST, &url, None, Some(&body), "sign in with password")
            .await?;
        decode(&bytes)
    }

    pub async fn sign_up(&self, body: SignUpRequest) -> Result<AuthDetailResp> {
        let url = format!("{}/signup", self.auth_url);
        let bytes = self
            .send(Method::POST, &url, None, Some(&body), "sign up")
            .await?;
        decode(&bytes)
    }

    /// Exchange a one-time token for a session.
    pub async fn verify(&self, body: VerifyRequest) -> Result<AuthDetailResp> {
        let url = format!("{}/verify", self.auth_url);
        let bytes = self
            .send(Method::POST, &url, None, Some(&body), "verify")
            .await?;
        decode(&bytes)
    }

    /// User owning `token`.
    pub async fn user(&self, token: &str) -> Result<User> {
        let url = format!("{}/user", self.auth_url);
        let bytes = self
            .send::<()>(Method::GET, &url, Some(token), None, "get user")
            .await?;
        decode(&bytes)
    }

    /// Revoke every session of the user owning `token`.
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        let url = format!("{}/logout?scope=global", self.auth_url);
        self.send::<()>(Method::POST, &url, Some(token), None, "sign out")
            .await
            .map(|_| ())
    }

    /// URL to send the browser to for an OAuth sign-in.
    pub fn authorize_url(&self, provider: Provider, redirect_url: Option<&str>) -> String {
        let mut url = format!("{}/authorize?provider={}", self.auth_url, provider);
        if let Some(redirect) = redirect_url.filter(|r| !r.is_empty()) {
            url.push_str("&redirect_to=");
            url.push_str(&urlencoding::encode(redirect));
        }
        url
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&B>,
        action: &str,
    ) -> Result<Vec<u8>> {
        let mut request = self
            .http_client
            .request(method, url)
            .header("apikey", &self.api_key);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("failed in httpclient call with err: {}", e);
            AuthError::NetworkError(e)
        })?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = String::from_utf8_lossy(&bytes).into_owned();
            warn!(
                "getting {} in {} due to err: {}",
                status.as_u16(),
                action,
                message
            );
            return Err(AuthError::ApiError { status, message });
        }
        Ok(bytes.to_vec())
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        error!("failed in unmarshal json with err: {}", e);
        AuthError::SerializationError(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url() {
        let auth = Auth::new("key", "https://ref.supabase.co/auth/v1/", Client::new());
        assert_eq!(auth.url(), "https://ref.supabase.co/auth/v1");
        assert_eq!(
            auth.authorize_url(Provider::Github, Some("https://app.example/cb?x=1")),
            "https://ref.supabase.co/auth/v1/authorize?provider=github&redirect_to=https%3A%2F%2Fapp.example%2Fcb%3Fx%3D1"
        );
        assert_eq!(
            auth.authorize_url(Provider::Google, None),
            "https://ref.supabase.co/auth/v1/authorize?provider=google"
        );
    }

    #[tokio::test]
    async fn test_local_validation_skips_network() {
        // Nothing listens here; validation must fail first.
        let auth = Auth::new("key", "http://127.0.0.1:9", Client::new());

        let err = auth
            .sign_in_with_otp(SignInRequest::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailOrPhoneEmpty));

        let err = auth
            .sign_in_with_password(SignInRequest::with_email("a@b.co"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordEmpty));
    }
}
