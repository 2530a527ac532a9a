use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of one-time token passed to `verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyType {
    #[serde(rename = "signup")]
    SignUp,
    #[serde(rename = "invite")]
    Invite,
    #[serde(rename = "magiclink")]
    MagicLink,
    #[serde(rename = "recovery")]
    Recovery,
    #[serde(rename = "email_change")]
    EmailChange,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "sms")]
    Sms,
    #[serde(rename = "phone_change")]
    PhoneChange,
}

impl VerifyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyType::SignUp => "signup",
            VerifyType::Invite => "invite",
            VerifyType::MagicLink => "magiclink",
            VerifyType::Recovery => "recovery",
            VerifyType::EmailChange => "email_change",
            VerifyType::Email => "email",
            VerifyType::Sms => "sms",
            VerifyType::PhoneChange => "phone_change",
        }
    }
}

impl fmt::Display for VerifyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAuth providers supported by GoTrue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Apple,
    Azure,
    Bitbucket,
    Discord,
    Facebook,
    Figma,
    Github,
    Gitlab,
    Google,
    Kakao,
    Keycloak,
    Linkedin,
    LinkedinOidc,
    Notion,
    Slack,
    Spotify,
    Twitch,
    Twitter,
    Workos,
    Zoom,
    Fly,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Apple => "apple",
            Provider::Azure => "azure",
            Provider::Bitbucket => "bitbucket",
            Provider::Discord => "discord",
            Provider::Facebook => "facebook",
            Provider::Figma => "figma",
            Provider::Github => "github",
            Provider::Gitlab => "gitlab",
            Provider::Google => "google",
            Provider::Kakao => "kakao",
            Provider::Keycloak => "keycloak",
            Provider::Linkedin => "linkedin",
            Provider::LinkedinOidc => "linkedin_oidc",
            Provider::Notion => "notion",
            Provider::Slack => "slack",
            Provider::Spotify => "spotify",
            Provider::Twitch => "twitch",
            Provider::Twitter => "twitter",
            Provider::Workos => "workos",
            Provider::Zoom => "zoom",
            Provider::Fly => "fly",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotrueMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<String>,
}

/// Body for `sign_in_with_otp` and `sign_in_with_password`.
///
/// Either `email` or `phone` must be set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignInRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// `sms` or `whatsapp`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub create_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gotrue_meta_security: Option<GotrueMeta>,
}

impl SignInRequest {
    pub fn with_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }

    pub fn with_phone(phone: &str) -> Self {
        Self {
            phone: Some(phone.to_string()),
            ..Default::default()
        }
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    pub(crate) fn has_identity(&self) -> bool {
        non_empty(&self.email) || non_empty(&self.phone)
    }

    pub(crate) fn has_password(&self) -> bool {
        non_empty(&self.password)
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gotrue_meta_security: Option<GotrueMeta>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_hash: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub verify_type: Option<VerifyType>,
}

/// Session returned by sign-in, sign-up and verify.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthDetailResp {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub expires_at: u64,
    pub provider_token: Option<String>,
    pub provider_refresh_token: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserMeta {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub aud: String,
    pub role: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub invited_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmation_sent_at: Option<DateTime<Utc>>,
    pub app_metadata: AppMetadata,
    pub user_metadata: UserMeta,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verify_type_wire_names() {
        assert_eq!(
            serde_json::to_value(VerifyType::MagicLink).unwrap(),
            json!("magiclink")
        );
        assert_eq!(VerifyType::EmailChange.to_string(), "email_change");
        assert_eq!(Provider::LinkedinOidc.to_string(), "linkedin_oidc");
    }

    #[test]
    fn test_sign_in_request_omits_unset_fields() {
        let body = SignInRequest::with_email("a@b.co").password("secret");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"email": "a@b.co", "password": "secret"})
        );
        assert!(body.has_identity());
        assert!(body.has_password());
        assert!(!SignInRequest::with_phone("  ").has_identity());
    }

    #[test]
    fn test_user_tolerates_missing_fields() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@b.co",
            "created_at": "2024-01-02T03:04:05Z",
            "app_metadata": {"provider": "email"}
        }))
        .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.app_metadata.provider.as_deref(), Some("email"));
        assert!(user.created_at.is_some());
        assert!(user.confirmed_at.is_none());
    }
}
