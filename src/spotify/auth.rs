use reqwest::{Client, header};
use serde_json::Value;

use crate::{
    config::Settings,
    error::{Result, SkipError},
    types::TokenGrant,
    utils,
};

/// Something that can trade the long-lived refresh token for an access token.
#[allow(async_fn_in_trait)]
pub trait TokenExchange {
    async fn exchange(&self) -> Result<TokenGrant>;
}

/// Refresh-token grant against Spotify's accounts service.
///
/// Spotify expects `grant_type=refresh_token` as a form body and the client
/// credentials as a Basic auth header. The response normally carries a new
/// `access_token` and an `expires_in` of about an hour; a rotated
/// `refresh_token` is rare and ignored.
pub struct SpotifyTokenExchange {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl SpotifyTokenExchange {
    pub fn new(http: Client, settings: &Settings) -> Self {
        Self {
            http,
            token_url: settings.spotify_token_url.clone(),
            client_id: settings.spotify_client_id.clone(),
            client_secret: settings.spotify_client_secret.clone(),
            refresh_token: settings.spotify_refresh_token.clone(),
        }
    }
}

impl TokenExchange for SpotifyTokenExchange {
    /// # Errors
    ///
    /// - `SkipError::Network` when the accounts service cannot be reached
    /// - `SkipError::Auth` on any non-200 answer or a body without `access_token`
    async fn exchange(&self) -> Result<TokenGrant> {
        let res = self
            .http
            .post(&self.token_url)
            .timeout(utils::HTTP_TIMEOUT)
            .header(
                header::AUTHORIZATION,
                utils::basic_auth_header(&self.client_id, &self.client_secret),
            )
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        if status != reqwest::StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(SkipError::Auth(format!(
                "failed to refresh token (HTTP {}): {}",
                status.as_u16(),
                body
            )));
        }

        let json: Value = res
            .json()
            .await
            .map_err(|e| SkipError::Auth(format!("malformed token response: {}", e)))?;

        let access_token = json["access_token"]
            .as_str()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SkipError::Auth(format!("no access_token in response: {}", json)))?
            .to_string();

        Ok(TokenGrant {
            access_token,
            expires_in: json["expires_in"].as_i64(),
        })
    }
}
