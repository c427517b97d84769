//! OAuth operations against the Spotify accounts service.
//!
//! Three operations: exchange an authorization code for tokens, refresh an
//! expired token, and build the user-facing consent URL. The two grants
//! return error-tagged `Credentials` on any failure rather than raising past
//! the client boundary.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::spotify::http_client;
use crate::spotify::types::Credentials;

pub const REDIRECT_URI: &str = "http://localhost:9878/callback";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const AUTHORIZE_URL: &str = "https://accounts.spotify.com/en/authorize";
const SCOPE: &str = "user-read-playback-state";

/// Contract for the token-granting operations, so the token lifecycle can be
/// exercised against a fake provider.
pub trait AuthApi {
    async fn exchange_code(&self, code: &str) -> Credentials;
    async fn refresh(&self, refresh_token: &str) -> Credentials;
}

#[derive(Debug, Clone)]
pub struct SpotifyAuth {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    /// Token lifetime in seconds.
    expires_in: u64,
}

impl SpotifyAuth {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    /// URL for the external browser consent flow. Pure construction, no
    /// network call.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(REDIRECT_URI),
            SCOPE
        )
    }

    fn basic_header(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", BASE64.encode(pair))
    }

    async fn token_grant(&self, params: &[(&str, &str)]) -> Result<TokenResponse, reqwest::Error> {
        let resp = http_client()
            .post(TOKEN_URL)
            .header("Authorization", self.basic_header())
            .form(params)
            .send()
            .await?;
        resp.error_for_status()?.json::<TokenResponse>().await
    }
}

impl AuthApi for SpotifyAuth {
    async fn exchange_code(&self, code: &str) -> Credentials {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
            ("code", code),
        ];
        match self.token_grant(&params).await {
            Ok(resp) => credentials_from(now_ms(), resp, None),
            Err(err) => {
                tracing::debug!(error = %err, "authorization code grant failed");
                Credentials::from_error(401, "Get access token failed")
            }
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Credentials {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        match self.token_grant(&params).await {
            Ok(resp) => credentials_from(now_ms(), resp, Some(refresh_token)),
            Err(err) => {
                tracing::debug!(error = %err, "refresh token grant failed");
                Credentials::from_error(401, "Refreshing token failed")
            }
        }
    }
}

/// Build credentials from a token response received at `now_ms`.
///
/// Expiry is anchored to the moment the response arrived, not to a
/// server-absolute timestamp. The prior refresh token is kept when the server
/// does not issue a new one.
fn credentials_from(now_ms: u64, resp: TokenResponse, prior_refresh: Option<&str>) -> Credentials {
    Credentials {
        access_token: Some(resp.access_token),
        refresh_token: resp
            .refresh_token
            .or_else(|| prior_refresh.map(str::to_string)),
        expires_at: Some(now_ms + resp.expires_in * 1000),
        error: None,
    }
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(token: &str, refresh: Option<&str>, expires_in: u64) -> TokenResponse {
        TokenResponse {
            access_token: token.to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_in,
        }
    }

    #[test]
    fn authorize_url_carries_the_consent_parameters() {
        let api = SpotifyAuth::new("my-client", "shh");
        let url = api.authorize_url();
        assert!(url.starts_with("https://accounts.spotify.com/en/authorize?"));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A9878%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=user-read-playback-state"));
    }

    #[test]
    fn expiry_is_anchored_to_the_response_instant() {
        let creds = credentials_from(5_000, response("tok", Some("ref"), 3600), None);
        assert_eq!(creds.expires_at, Some(5_000 + 3600 * 1000));
        assert_eq!(creds.access_token.as_deref(), Some("tok"));
        assert!(creds.error.is_none());
    }

    #[test]
    fn refresh_keeps_prior_refresh_token_when_server_omits_it() {
        let creds = credentials_from(0, response("tok", None, 60), Some("old-refresh"));
        assert_eq!(creds.refresh_token.as_deref(), Some("old-refresh"));

        let creds = credentials_from(0, response("tok", Some("new-refresh"), 60), Some("old-refresh"));
        assert_eq!(creds.refresh_token.as_deref(), Some("new-refresh"));
    }

    #[test]
    fn exchange_then_refresh_yields_strictly_later_expiry() {
        let first = credentials_from(1_000, response("a", Some("r"), 3600), None);
        let second = credentials_from(2_000, response("b", None, 3600), first.refresh_token.as_deref());
        assert!(second.expires_at.unwrap() > first.expires_at.unwrap());
        assert_eq!(second.refresh_token, first.refresh_token);
    }
}
