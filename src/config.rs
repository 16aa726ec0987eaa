//! The configuration file.

use crate::error::{Error, Result};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tubegrab_core::{Downloader, Quality};

/// The name of the directory holding the configuration and the history.
pub const APP_DIR: &str = "tubegrab";

/// The user settings, read from a TOML file. Every entry is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// The 'yt-dlp' executable, a bare name is looked up in `PATH`.
    pub executable: PathBuf,
    /// The directory downloads are saved into.
    pub download_dir: PathBuf,
    pub quality: Quality,
    /// The history file, defaults to the user data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    pub metadata_timeout_secs: u64,
    /// No timeout when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let download_dir = dirs::download_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
            .unwrap_or_else(|| PathBuf::from("Downloads"));

        Self {
            executable: PathBuf::from("yt-dlp"),
            download_dir,
            quality: Quality::default(),
            history_file: None,
            metadata_timeout_secs: tubegrab_core::DEFAULT_TIMEOUT.as_secs(),
            download_timeout_secs: None,
        }
    }
}

impl Config {
    /// Returns `<config dir>/tubegrab/config.toml`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Loads the configuration, falling back to the defaults.
    ///
    /// A missing file is not an error. An unreadable or malformed file is logged and ignored,
    /// it is never overwritten.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path.as_ref()) {
            Ok(config) => config,
            Err(Error::Config(e)) => {
                error!("Malformed config file {}: {}", path.as_ref().display(), e);
                Self::default()
            }
            Err(e) => {
                warn!("Could not read config file {}: {}", path.as_ref().display(), e);
                Self::default()
            }
        }
    }

    /// Loads the configuration, reporting unreadable and malformed files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but could not be read, and [`Error::Config`]
    /// if it is not valid TOML.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(toml::from_str::<Config>(&content)?)
    }

    /// Writes the configuration, creating its directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let value = toml::to_string_pretty(self)?;
        fs::write(path, value)?;

        debug!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Returns the history file, `<data dir>/tubegrab/download_history.json` unless configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDataDir`] if no file is configured and the platform has no data
    /// directory.
    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_file {
            return Ok(path.clone());
        }

        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join("download_history.json"))
            .ok_or(Error::NoDataDir)
    }

    /// Builds the downloader described by this configuration.
    pub fn downloader(&self) -> Downloader {
        let mut downloader = Downloader::new(&self.executable);
        downloader
            .with_timeout(Duration::from_secs(self.metadata_timeout_secs))
            .with_download_timeout(self.download_timeout_secs.map(Duration::from_secs));

        downloader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = Config::load(dir.path().join("config.toml"));

        assert_eq!(config, Config::default());
        assert_eq!(config.metadata_timeout_secs, 30);
        assert_eq!(config.download_timeout_secs, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "quality = \"720p\"\ndownload_timeout_secs = 600\n").unwrap();

        let config = Config::load(&path);

        assert_eq!(config.quality, Quality::P720);
        assert_eq!(config.download_timeout_secs, Some(600));
        assert_eq!(config.executable, PathBuf::from("yt-dlp"));
    }

    #[test]
    fn malformed_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "quality = [").unwrap();

        assert_matches!(Config::try_load(&path), Err(Error::Config(_)));
        assert_eq!(Config::load(&path), Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "quality = [");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            quality: Quality::AudioOnly,
            history_file: Some(dir.path().join("history.json")),
            ..Config::default()
        };

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path), config);
    }

    #[test]
    fn configured_history_path_wins() {
        let config = Config {
            history_file: Some(PathBuf::from("/tmp/history.json")),
            ..Config::default()
        };

        assert_eq!(
            config.history_path().unwrap(),
            PathBuf::from("/tmp/history.json")
        );
    }

    #[test]
    fn downloader_uses_the_timeouts() {
        let config = Config {
            metadata_timeout_secs: 5,
            download_timeout_secs: Some(60),
            ..Config::default()
        };

        let downloader = config.downloader();

        assert_eq!(downloader.timeout, Duration::from_secs(5));
        assert_eq!(downloader.download_timeout, Some(Duration::from_secs(60)));
    }
}
