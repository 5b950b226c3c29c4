//! # CLI Module
//!
//! Command implementations behind the `spotskip` binary.
//!
//! ## Commands
//!
//! ### Running
//!
//! - [`run`] - Claims the control address, starts the control server and runs
//!   the skipper loop until exit
//! - [`check`] - One token refresh plus one history lookup, nothing is skipped
//!
//! ### Control
//!
//! These talk to the running instance over its local control API:
//!
//! - [`send`] with a [`ControlCommand`] - pause, resume, toggle, keep, exit
//! - [`status`] - Table of the running instance's state
//! - [`logs`] - Location of the log folder
//!
//! ## Usage
//!
//! ```bash
//! spotskip run        # start skipping
//! spotskip pause      # stop skipping for a while
//! spotskip keep       # don't skip the song playing now
//! spotskip resume
//! ```

mod check;
mod control;
mod run;

pub use check::check;
pub use control::ControlCommand;
pub use control::logs;
pub use control::send;
pub use control::status;
pub use run::SpotifySkipper;
pub use run::build_skipper;
pub use run::run;
