//! Progress events emitted while a download runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A progress update, delivered synchronously and in order to the caller's callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// Data is being transferred.
    Downloading {
        /// The number of bytes downloaded so far.
        downloaded_bytes: f64,
        /// The total size of the file being downloaded, in bytes.
        total_bytes: f64,
        /// The output file, when already known.
        filename: Option<PathBuf>,
    },
    /// The tool exited cleanly and produced this file.
    Finished {
        /// The output file.
        filename: PathBuf,
    },
}

impl ProgressEvent {
    /// Returns the completed fraction, in `[0, 1]`.
    ///
    /// A finished event is complete, a download of unknown size is at 0.
    pub fn fraction(&self) -> f64 {
        match self {
            ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                ..
            } => {
                if *total_bytes > 0.0 {
                    (downloaded_bytes / total_bytes).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            ProgressEvent::Finished { .. } => 1.0,
        }
    }

    /// Returns the file the event refers to, if known.
    pub fn filename(&self) -> Option<&PathBuf> {
        match self {
            ProgressEvent::Downloading { filename, .. } => filename.as_ref(),
            ProgressEvent::Finished { filename } => Some(filename),
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Downloading { .. } => {
                write!(f, "Downloading: {:.1}%", self.fraction() * 100.0)
            }
            ProgressEvent::Finished { filename } => {
                write!(f, "Finished: {}", filename.display())
            }
        }
    }
}
