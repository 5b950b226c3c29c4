use chrono::{DateTime, Duration, Utc};

use crate::{
    error::Result,
    spotify::auth::TokenExchange,
    success,
    types::{Credential, TokenGrant},
};

/// Assumed lifetime when the token response omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
/// How long before the reported expiry the token is considered stale.
pub const REFRESH_MARGIN_SECS: i64 = 100;

/// Holds the current access token and refreshes it lazily.
///
/// The manager never retries on its own: a failed refresh is returned to the
/// caller and the next request starts a fresh exchange.
pub struct TokenManager<E> {
    exchange: E,
    credential: Option<Credential>,
}

impl<E: TokenExchange> TokenManager<E> {
    pub fn new(exchange: E) -> Self {
        TokenManager {
            exchange,
            credential: None,
        }
    }

    pub async fn get_valid_token(&mut self) -> Result<String> {
        self.get_valid_token_at(Utc::now()).await
    }

    /// Same as [`get_valid_token`](Self::get_valid_token) with an explicit clock reading.
    pub async fn get_valid_token_at(&mut self, now: DateTime<Utc>) -> Result<String> {
        if let Some(credential) = &self.credential {
            if now < credential.expires_at {
                return Ok(credential.access_token.clone());
            }
        }

        let grant = self.exchange.exchange().await?;
        let credential = credential_from(grant, now);
        let token = credential.access_token.clone();
        self.credential = Some(credential);

        success!("[Spotify] Access token refreshed.");
        Ok(token)
    }

    pub fn current_credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }
}

fn credential_from(grant: TokenGrant, now: DateTime<Utc>) -> Credential {
    let lifetime = grant.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    let usable = (lifetime - REFRESH_MARGIN_SECS).max(0);
    Credential {
        access_token: grant.access_token,
        expires_at: now + Duration::seconds(usable),
    }
}
