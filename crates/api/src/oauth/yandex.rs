//! Yandex ID OAuth client.
//!
//! The authorization-code flow is two calls: exchange the code for an access
//! token at the token endpoint, then read the user's identity from the info
//! endpoint with `Authorization: OAuth <token>`.

use serde::Deserialize;

pub const PROVIDER: &str = "yandex";

/// Prefix of codes accepted without contacting Yandex when demo mode is on.
pub const DEMO_CODE_PREFIX: &str = "demo_";

const DEFAULT_TOKEN_URL: &str = "https://oauth.yandex.ru/token";
const DEFAULT_INFO_URL: &str = "https://login.yandex.ru/info?format=json";

#[derive(Debug, Clone, Default)]
pub struct YandexConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_url: String,
    pub info_url: String,
    pub demo_mode: bool,
}

impl YandexConfig {
    /// Load Yandex OAuth settings from environment variables.
    ///
    /// | Env Var                | Default                                     |
    /// |------------------------|---------------------------------------------|
    /// | `YANDEX_CLIENT_ID`     | empty (OAuth disabled)                      |
    /// | `YANDEX_CLIENT_SECRET` | empty                                       |
    /// | `YANDEX_REDIRECT_URI`  | empty                                       |
    /// | `YANDEX_TOKEN_URL`     | `https://oauth.yandex.ru/token`             |
    /// | `YANDEX_INFO_URL`      | `https://login.yandex.ru/info?format=json`  |
    /// | `OAUTH_DEMO_MODE`      | `false`                                     |
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            client_id: var("YANDEX_CLIENT_ID"),
            client_secret: var("YANDEX_CLIENT_SECRET"),
            redirect_uri: var("YANDEX_REDIRECT_URI"),
            token_url: std::env::var("YANDEX_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.into()),
            info_url: std::env::var("YANDEX_INFO_URL").unwrap_or_else(|_| DEFAULT_INFO_URL.into()),
            demo_mode: matches!(
                var("OAUTH_DEMO_MODE").to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.client_id.is_empty()
    }

    /// How `/auth/oauth/yandex` currently resolves codes: `demo`, `live` or `disabled`.
    pub fn mode(&self) -> &'static str {
        if self.demo_mode {
            "demo"
        } else if self.is_enabled() {
            "live"
        } else {
            "disabled"
        }
    }
}

/// An identity asserted by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthIdentity {
    /// Provider-scoped stable user id.
    pub subject: String,
    pub email: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Yandex OAuth is not configured")]
    Disabled,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("User info request failed: {0}")]
    UserInfo(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
    default_email: Option<String>,
    #[serde(default)]
    emails: Vec<String>,
    login: Option<String>,
    real_name: Option<String>,
    display_name: Option<String>,
    first_name: Option<String>,
    default_avatar_id: Option<String>,
    #[serde(default)]
    is_avatar_empty: bool,
}

impl UserInfo {
    fn into_identity(self) -> Result<OAuthIdentity, OAuthError> {
        let email = self
            .default_email
            .or_else(|| self.emails.into_iter().next())
            .or_else(|| self.login.as_ref().map(|l| format!("{l}@yandex.ru")))
            .ok_or_else(|| OAuthError::UserInfo("account has no email".into()))?;
        let full_name = [self.real_name, self.display_name, self.first_name]
            .into_iter()
            .flatten()
            .map(|n| n.trim().to_string())
            .find(|n| !n.is_empty())
            .unwrap_or_else(|| "Yandex User".to_string());
        let avatar = self
            .default_avatar_id
            .filter(|_| !self.is_avatar_empty)
            .map(|id| format!("https://avatars.yandex.net/get-yapic/{id}/islands-200"));

        Ok(OAuthIdentity {
            subject: self.id,
            email,
            full_name,
            avatar,
        })
    }
}

/// HTTP client for Yandex ID.
#[derive(Debug, Clone)]
pub struct YandexClient {
    http: reqwest::Client,
    config: YandexConfig,
}

impl YandexClient {
    pub fn new(config: YandexConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Resolve an authorization code to the user's identity.
    ///
    /// Demo codes are honoured only when demo mode is on; otherwise they go to
    /// the provider like any other code. Provider failures are returned as-is.
    pub async fn authenticate(&self, code: &str) -> Result<OAuthIdentity, OAuthError> {
        if self.config.demo_mode && code.starts_with(DEMO_CODE_PREFIX) {
            tracing::info!("Using demo OAuth identity");
            return Ok(demo_identity(code));
        }
        if !self.config.is_enabled() {
            return Err(OAuthError::Disabled);
        }

        let access_token = self.exchange_code(code).await?;
        self.fetch_identity(&access_token).await
    }

    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchange(format!("status {status}: {body}")));
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<OAuthIdentity, OAuthError> {
        let response = self
            .http
            .get(&self.config.info_url)
            .header(reqwest::header::AUTHORIZATION, format!("OAuth {access_token}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::UserInfo(format!("status {status}")));
        }
        let info: UserInfo = response.json().await?;
        info.into_identity()
    }
}

/// A synthetic identity derived from the code, so repeating the same demo
/// code signs into the same account.
fn demo_identity(code: &str) -> OAuthIdentity {
    let suffix: String = code[DEMO_CODE_PREFIX.len()..]
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    let suffix = if suffix.is_empty() { "user".to_string() } else { suffix };
    OAuthIdentity {
        subject: format!("demo_{suffix}"),
        email: format!("yandex.demo.{suffix}@example.com"),
        full_name: "Yandex Demo User".to_string(),
        avatar: None,
    }
}
