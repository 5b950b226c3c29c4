mod auth;
mod pattern;
mod state;

pub use auth::DEFAULT_TOKEN_LIFETIME_SECS;
pub use auth::REFRESH_MARGIN_SECS;
pub use auth::TokenManager;
pub use pattern::PatternDetector;
pub use state::ControlState;
