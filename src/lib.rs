//! Download videos through 'yt-dlp' and keep a history of them.
//!
//! The downloading itself is done by [`tubegrab_core`], this crate adds the configuration file,
//! the download history and a [`Session`] tying them together.

pub mod config;
pub mod error;
pub mod history;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryStatus, HistoryStore};
pub use session::Session;
