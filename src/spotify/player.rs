use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use crate::{
    config::Settings,
    error::{Result, SkipError},
    management::TokenManager,
    spotify::auth::{SpotifyTokenExchange, TokenExchange},
    types::{CurrentlyPlayingResponse, PlayContextRequest, PlayerStateResponse, Track},
    utils, warning,
};

/// Read and control operations on the user's active Spotify player.
#[allow(async_fn_in_trait)]
pub trait Playback {
    /// The track currently playing, or `None` when nothing is.
    async fn current_track(&mut self) -> Result<Option<Track>>;
    async fn is_paused(&mut self) -> Result<bool>;
    async fn skip(&mut self) -> Result<()>;
    async fn pause(&mut self) -> Result<()>;
    /// Starts `context_uri`, optionally setting the shuffle state first.
    async fn play(&mut self, context_uri: &str, shuffle: Option<bool>) -> Result<()>;
    async fn enable_shuffle(&mut self, state: bool) -> Result<()>;
    async fn current_context_uri(&mut self) -> Result<Option<String>>;
}

/// Spotify Web API implementation of [`Playback`].
///
/// Every request fetches its bearer token from the [`TokenManager`] first,
/// so an expired token is refreshed transparently.
///
/// ## Endpoints
///
/// - `GET /me/player/currently-playing` (204 means nothing is playing)
/// - `GET /me/player` for pause state and context
/// - `POST /me/player/next`
/// - `PUT /me/player/pause`
/// - `PUT /me/player/play` with a `context_uri` body
/// - `PUT /me/player/shuffle?state=...`
pub struct PlaybackClient<E = SpotifyTokenExchange> {
    http: Client,
    api_url: String,
    tokens: TokenManager<E>,
}

impl PlaybackClient<SpotifyTokenExchange> {
    pub fn from_settings(http: Client, settings: &Settings) -> Self {
        let exchange = SpotifyTokenExchange::new(http.clone(), settings);
        Self::new(http, settings.spotify_api_url.clone(), TokenManager::new(exchange))
    }
}

impl<E: TokenExchange> PlaybackClient<E> {
    pub fn new(http: Client, api_url: String, tokens: TokenManager<E>) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenManager<E> {
        &self.tokens
    }

    async fn request(&mut self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.tokens.get_valid_token().await?;
        let url = format!("{}{}", self.api_url, path);
        Ok(self
            .http
            .request(method, url)
            .timeout(utils::HTTP_TIMEOUT)
            .bearer_auth(token))
    }

    async fn player_state(&mut self) -> Result<Option<PlayerStateResponse>> {
        let res = self.request(Method::GET, "/me/player").await?.send().await?;
        match res.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => {
                let state = res.json::<PlayerStateResponse>().await?;
                Ok(Some(state))
            }
            status => {
                let body = res.text().await.unwrap_or_default();
                Err(SkipError::UnexpectedResponse(format!(
                    "player state HTTP {}: {}",
                    status.as_u16(),
                    body
                )))
            }
        }
    }
}

/// Sends a command whose rejection is only reported. Transport failures
/// still propagate.
async fn advisory(command: &'static str, builder: RequestBuilder) -> Result<()> {
    let res = builder.send().await?;
    if let Err(e) = check_command(command, res).await {
        warning!("[Spotify] {}", e);
    }
    Ok(())
}

async fn check_command(command: &'static str, res: Response) -> Result<()> {
    let status = res.status();
    if utils::is_command_success(status) {
        return Ok(());
    }
    let body = res.text().await.unwrap_or_default();
    Err(SkipError::CommandRejected {
        command,
        status: status.as_u16(),
        body,
    })
}

fn track_from(response: CurrentlyPlayingResponse) -> Option<Track> {
    let item = response.item?;
    let artist = item.artists.into_iter().next().and_then(|a| a.name)?;
    let id = item.id.filter(|id| !id.is_empty())?;
    let name = item.name.filter(|name| !name.is_empty())?;
    if artist.is_empty() {
        return None;
    }
    Some(Track { id, name, artist })
}

impl<E: TokenExchange> Playback for PlaybackClient<E> {
    async fn current_track(&mut self) -> Result<Option<Track>> {
        let res = self
            .request(Method::GET, "/me/player/currently-playing")
            .await?
            .send()
            .await?;

        match res.status() {
            StatusCode::NO_CONTENT => Ok(None),
            StatusCode::OK => match res.json::<CurrentlyPlayingResponse>().await {
                Ok(body) => Ok(track_from(body)),
                Err(e) if e.is_decode() => {
                    warning!("[Spotify] Unreadable currently-playing response: {}", e);
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            },
            status => {
                let body = res.text().await.unwrap_or_default();
                warning!("[Spotify] Unexpected status {}: {}", status.as_u16(), body);
                Ok(None)
            }
        }
    }

    /// A player without an active device reports as not paused: there is no
    /// state worth restoring.
    async fn is_paused(&mut self) -> Result<bool> {
        Ok(self
            .player_state()
            .await?
            .map(|state| !state.is_playing)
            .unwrap_or(false))
    }

    async fn skip(&mut self) -> Result<()> {
        let builder = self
            .request(Method::POST, "/me/player/next")
            .await?
            .body("");
        advisory("skip", builder).await
    }

    async fn pause(&mut self) -> Result<()> {
        let builder = self
            .request(Method::PUT, "/me/player/pause")
            .await?
            .body("");
        advisory("pause", builder).await
    }

    async fn play(&mut self, context_uri: &str, shuffle: Option<bool>) -> Result<()> {
        if let Some(state) = shuffle {
            self.enable_shuffle(state).await?;
        }
        let res = self
            .request(Method::PUT, "/me/player/play")
            .await?
            .json(&PlayContextRequest { context_uri })
            .send()
            .await?;
        check_command("play", res).await
    }

    async fn enable_shuffle(&mut self, state: bool) -> Result<()> {
        let res = self
            .request(Method::PUT, "/me/player/shuffle")
            .await?
            .query(&[("state", if state { "true" } else { "false" })])
            .body("")
            .send()
            .await?;
        check_command("shuffle", res).await
    }

    async fn current_context_uri(&mut self) -> Result<Option<String>> {
        Ok(self
            .player_state()
            .await?
            .and_then(|state| state.context)
            .map(|context| context.uri)
            .filter(|uri| !uri.is_empty()))
    }
}
