//! Spotify Auto-Skipper Library
//!
//! Watches what is currently playing on a Spotify account, looks up when the
//! same track was last scrobbled to Last.fm, and skips it when it was played
//! within the configured window.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local control surface
//! - `cli` - Command implementations behind the binary's subcommands
//! - `config` - Settings file loading and typed settings
//! - `error` - Error taxonomy and `Result` alias
//! - `lastfm` - Last.fm listening-history client
//! - `logging` - Timestamped console and daily file output
//! - `management` - Token cache, repeat-pattern detector and shared control state
//! - `server` - Local control server and single-instance guard
//! - `skipper` - The poll, compare, decide, act loop
//! - `spotify` - Spotify Web API token exchange and playback client
//! - `types` - Data structures and wire shapes
//! - `utils` - Small helpers shared by the clients
//!
//! # Example
//!
//! ```
//! use spotskip::config;
//!
//! #[tokio::main]
//! async fn main() -> spotskip::Result<()> {
//!     config::load_env(None).await?;
//!     let settings = config::Settings::from_env()?;
//!     // Build the clients and the skipper...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod lastfm;
pub mod logging;
pub mod management;
pub mod server;
pub mod skipper;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Result, SkipError};

/// Logs an informational message with a blue bullet point.
///
/// Writes a `[HH:MM:SS] [o]` line to the console and, once
/// [`logging::init`] has run, the same line without colors to today's log
/// file. Used for the routine narration of every cycle.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Auto-skipper enabled. Skip window: {} days", 60);
/// info!("Nothing is playing right now.");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    $crate::logging::emit($crate::logging::Level::Info, std::format_args!($($arg)*));
  })
}

/// Logs a success message with a green checkmark.
///
/// Marks an outcome the user cares about: a track that is old enough to
/// keep playing, a completed restart, an accepted control command.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Playlist restarted with shuffle enabled.");
/// success!("Spotify credentials work.");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    $crate::logging::emit($crate::logging::Level::Success, std::format_args!($($arg)*));
  })
}

/// Logs a warning with a yellow exclamation mark.
///
/// Used for recoverable problems: a rejected skip, a failed history lookup,
/// an aborted restart.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    $crate::logging::emit($crate::logging::Level::Warning, std::format_args!($($arg)*));
  })
}

/// Logs an error with a red cross.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// Unlike [`fatal!`] this macro returns normally. The skipper loop uses it
/// for failed cycles and keeps polling afterwards.
///
/// # Example
///
/// ```
/// error!("Unexpected error: {}", err);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    $crate::logging::emit($crate::logging::Level::Error, std::format_args!($($arg)*));
  })
}

/// Logs an error and exits the program with code 1.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// The process exits immediately after the line is written, so the macro
/// can stand in for a value in a `match` arm. Only for startup failures
/// and CLI commands where there is nothing left to run.
///
/// # Example
///
/// ```
/// let settings = match config::Settings::from_env() {
///     Ok(settings) => settings,
///     Err(e) => fatal!("{}", e),
/// };
/// ```
#[macro_export]
macro_rules! fatal {
  ($($arg:tt)*) => ({
    $crate::logging::emit($crate::logging::Level::Error, std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Logs a "now playing" line with a magenta note.
///
/// The line is preceded by a blank line on the console and in the log file
/// so each observed track starts a visible block.
///
/// # Example
///
/// ```
/// playing!("Currently playing: {} – {}", track.artist, track.name);
/// ```
#[macro_export]
macro_rules! playing {
  ($($arg:tt)*) => ({
    $crate::logging::emit($crate::logging::Level::Track, std::format_args!($($arg)*));
  })
}
