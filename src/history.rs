//! The download history, a JSON list of past downloads, most recent first.

use crate::error::Result;
use chrono::Local;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The format of [`HistoryEntry::date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FILE_NOT_FOUND: &str = "File not found";
const UNKNOWN_SIZE: &str = "Unknown";

/// Whether the downloaded file is still on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    #[default]
    Completed,
    FileMissing,
}

/// A past download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub title: String,
    pub url: String,
    pub filepath: PathBuf,
    #[serde(default)]
    pub thumbnail: String,
    /// When the download was recorded, local time, see [`DATE_FORMAT`].
    #[serde(default)]
    pub date: String,
    /// The human readable size of the file when it was recorded.
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub status: HistoryStatus,
}

/// The history of downloads, persisted as a JSON file.
///
/// Reading never fails: a missing, unreadable or malformed file gives an empty history. Writing
/// failures are logged and the in-memory history is kept.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Opens the history stored at the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - The history file, it does not need to exist.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);

        debug!(
            "Opened history {} with {} entries",
            path.display(),
            entries.len()
        );
        Self { path, entries }
    }

    /// Opens the history file named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDataDir`](crate::Error::NoDataDir) if no path is configured and none
    /// can be derived.
    pub fn open_default(config: &crate::config::Config) -> Result<Self> {
        Ok(Self::open(config.history_path()?))
    }

    /// Returns the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records a download and saves the history.
    ///
    /// The entry is marked [`HistoryStatus::FileMissing`] if the file does not exist.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the video.
    /// * `url` - The URL it was downloaded from.
    /// * `filepath` - The downloaded file.
    /// * `thumbnail` - The thumbnail URL, may be empty.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        url: impl Into<String>,
        filepath: impl Into<PathBuf>,
        thumbnail: impl Into<String>,
    ) -> HistoryEntry {
        let filepath = filepath.into();
        let status = if filepath.exists() {
            HistoryStatus::Completed
        } else {
            HistoryStatus::FileMissing
        };

        let entry = HistoryEntry {
            title: title.into(),
            url: url.into(),
            size: file_size(&filepath),
            filepath,
            thumbnail: thumbnail.into(),
            date: Local::now().format(DATE_FORMAT).to_string(),
            status,
        };

        self.entries.insert(0, entry.clone());
        self.persist();

        entry
    }

    /// Returns the entries, most recent first.
    ///
    /// Completed entries whose file is gone are marked [`HistoryStatus::FileMissing`]. The change
    /// is only kept in memory until the next [`save`](Self::save) or modification.
    pub fn list(&mut self) -> &[HistoryEntry] {
        for entry in &mut self.entries {
            if entry.status == HistoryStatus::Completed && !entry.filepath.exists() {
                debug!("{} is missing", entry.filepath.display());
                entry.status = HistoryStatus::FileMissing;
            }
        }

        &self.entries
    }

    /// Removes every entry of the given file. Saves the history only if something was removed.
    ///
    /// Returns true if an entry was removed.
    pub fn remove(&mut self, filepath: impl AsRef<Path>) -> bool {
        let filepath = filepath.as_ref();
        let count = self.entries.len();
        self.entries.retain(|entry| entry.filepath != filepath);

        if self.entries.len() == count {
            return false;
        }

        self.persist();
        true
    }

    /// Removes every entry and saves the empty history.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the history, creating its directory if needed.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            error!("Failed to save history to {}: {}", self.path.display(), e);
        }
    }
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryStatus::Completed => write!(f, "completed"),
            HistoryStatus::FileMissing => write!(f, "file_missing"),
        }
    }
}

fn load(path: &Path) -> Vec<HistoryEntry> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Failed to read history {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let values = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(values)) => values,
        Ok(_) => {
            warn!("History {} is not a list, starting over", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to parse history {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable history entry: {}", e);
                None
            }
        })
        .collect()
}

/// Returns the size of the file in B, KB, MB or GB, with two decimals.
fn file_size(path: &Path) -> String {
    match fs::metadata(path) {
        Ok(metadata) => human_size(metadata.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => FILE_NOT_FOUND.to_string(),
        Err(e) => {
            warn!("Failed to read the size of {}: {}", path.display(), e);
            UNKNOWN_SIZE.to_string()
        }
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", size, UNITS[unit])
}
