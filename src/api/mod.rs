//! # API Module
//!
//! HTTP handlers of the local control surface. They take the place of a
//! tray menu: pause and resume skipping, keep the current song, find the
//! log folder, exit.
//!
//! ## Endpoints
//!
//! - [`health`] - `GET /health`, liveness and version
//! - [`status`] - `GET /status`, pause flag, keep mark and last observed track
//! - [`pause`], [`resume`], [`toggle`] - `POST`, change the pause flag
//! - [`keep`] - `POST /keep`, don't skip the track that is playing now
//! - [`logs`] - `GET /logs`, location of the log folder
//! - [`exit`] - `POST /exit`, stop the process
//!
//! All handlers share one [`ControlState`](crate::management::ControlState)
//! through an axum `Extension`.

mod control;
mod health;

pub use control::exit;
pub use control::keep;
pub use control::logs;
pub use control::pause;
pub use control::resume;
pub use control::status;
pub use control::toggle;
pub use health::health;
