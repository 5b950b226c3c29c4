use std::path::PathBuf;

use reqwest::Client;
use serde_json::Value;
use tabled::Table;

use crate::{
    config, fatal, info, success,
    types::{ControlStatus, StatusTableRow},
    utils, warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Toggle,
    Keep,
    Exit,
}

impl ControlCommand {
    pub fn path(self) -> &'static str {
        match self {
            ControlCommand::Pause => "/pause",
            ControlCommand::Resume => "/resume",
            ControlCommand::Toggle => "/toggle",
            ControlCommand::Keep => "/keep",
            ControlCommand::Exit => "/exit",
        }
    }
}

fn base_url() -> String {
    match config::control_address() {
        Ok(addr) => format!("http://{}", addr),
        Err(e) => fatal!("{}", e),
    }
}

fn client() -> Client {
    match utils::http_client() {
        Ok(client) => client,
        Err(e) => fatal!("{}", e),
    }
}

/// Sends a command to the running instance.
pub async fn send(command: ControlCommand) {
    let url = format!("{}{}", base_url(), command.path());
    let res = match client().post(&url).send().await {
        Ok(res) => res,
        Err(e) => fatal!(
            "Cannot reach a running instance at {}. Start one with `{} run`.\n Error: {}",
            url,
            env!("CARGO_PKG_NAME"),
            e
        ),
    };

    let status = res.status();
    let body: Value = res.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let reason = body["error"].as_str().unwrap_or("request rejected");
        fatal!("Command failed (HTTP {}): {}", status.as_u16(), reason);
    }

    match command {
        ControlCommand::Pause | ControlCommand::Resume | ControlCommand::Toggle => {
            if body["paused"].as_bool().unwrap_or(false) {
                success!("Skipping paused.");
            } else {
                success!("Skipping resumed.");
            }
        }
        ControlCommand::Keep => {
            success!("The song playing now won't be skipped.");
            if body["paused"].as_bool().unwrap_or(false) {
                warning!("Skipping is paused, the request applies once it resumes.");
            }
        }
        ControlCommand::Exit => success!("Running instance is shutting down."),
    }
}

pub async fn status() {
    let url = format!("{}/status", base_url());
    let status = match client().get(&url).send().await {
        Ok(res) => match res.json::<ControlStatus>().await {
            Ok(status) => status,
            Err(e) => fatal!("Unreadable status response: {}", e),
        },
        Err(e) => fatal!("No running instance at {}.\n Error: {}", url, e),
    };

    let rows = vec![
        StatusTableRow {
            setting: "Skipping".to_string(),
            value: if status.paused { "paused" } else { "active" }.to_string(),
        },
        StatusTableRow {
            setting: "Now playing".to_string(),
            value: status
                .now_playing
                .as_ref()
                .map(|t| format!("{} – {}", t.artist, t.name))
                .unwrap_or_else(|| "-".to_string()),
        },
        StatusTableRow {
            setting: "Kept track".to_string(),
            value: match (status.kept_track, status.keep_pending) {
                (_, true) => "requested".to_string(),
                (Some(id), false) => id,
                (None, false) => "-".to_string(),
            },
        },
        StatusTableRow {
            setting: "Version".to_string(),
            value: status.version,
        },
    ];

    println!("{}", Table::new(rows));
}

/// Prints the log folder and tries to open it.
pub async fn logs() {
    let url = format!("{}/logs", base_url());
    let path = match client().get(&url).send().await {
        Ok(res) => res
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body["path"].as_str().map(PathBuf::from))
            .unwrap_or_else(config::logs_dir),
        Err(_) => config::logs_dir(),
    };

    info!("Logs are in {}", path.display());
    if webbrowser::open(&format!("file://{}", path.display())).is_err() {
        warning!("Cannot open the log folder automatically.");
    }
}
