//! The errors of the application layer.

use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A failure of the downloader itself.
    #[error(transparent)]
    Core(#[from] tubegrab_core::Error),
    /// Another download is still running.
    #[error("A download is already in progress")]
    Busy,
    /// The configuration file is malformed.
    #[error("Malformed config file: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Failed to serialize: {0}")]
    Serialize(String),
    #[error("An IO error occurred: {0}")]
    Io(#[from] std::io::Error),
    /// No data directory could be determined for the current user.
    #[error("Could not find a valid data directory")]
    NoDataDir,
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialize(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Serialize(e.to_string())
    }
}
