use reqwest::Client;

use crate::{utils, warning};

/// External on/off switch consulted before every cycle.
#[allow(async_fn_in_trait)]
pub trait Gate {
    async fn is_enabled(&self) -> bool;
}

/// Reads a plain-text switch from a URL.
///
/// Skipping is blocked only when the body explicitly says something other
/// than `on`. Without a URL, or when the request fails, the gate is open.
pub struct RemoteGate {
    http: Client,
    url: Option<String>,
}

impl RemoteGate {
    pub fn new(http: Client, url: Option<String>) -> Self {
        Self { http, url }
    }
}

impl Gate for RemoteGate {
    async fn is_enabled(&self) -> bool {
        let Some(url) = &self.url else {
            return true;
        };

        let res = match self
            .http
            .get(url)
            .timeout(utils::HTTP_TIMEOUT)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warning!("[Remote] Switch unreachable, skipping stays enabled: {}", e);
                return true;
            }
        };

        if !res.status().is_success() {
            warning!(
                "[Remote] Switch returned HTTP {}, skipping stays enabled",
                res.status().as_u16()
            );
            return true;
        }

        match res.text().await {
            Ok(body) => utils::remote_switch_allows(&body),
            Err(e) => {
                warning!("[Remote] Unreadable switch body, skipping stays enabled: {}", e);
                true
            }
        }
    }
}
