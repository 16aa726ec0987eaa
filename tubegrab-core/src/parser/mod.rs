//! Incremental parser for the output of a running 'yt-dlp' download.
//!
//! The tool output is treated as an untyped protocol. Each line goes through two independent
//! recognizers: [`summary`] for the JSON object printed at the end, and [`progress`] for the
//! human-readable progress lines. Lines neither recognizes are ignored, so new output
//! variants degrade to "no progress" rather than to a failure.

use crate::model::{ProgressEvent, VideoMetadata};
use std::path::{Path, PathBuf};

pub mod progress;
pub mod summary;

use progress::ProgressLine;

/// The parse state of a single download.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputParser {
    /// The best-known output file, updated by the most recent line naming one.
    filepath: Option<PathBuf>,
    /// The metadata of the last summary successfully parsed.
    summary: Option<VideoMetadata>,
    /// The number of summary lines that could not be parsed.
    malformed_summaries: usize,
}

impl OutputParser {
    /// Creates a parser with no state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line of output, returns the progress event it produces, if any.
    pub fn feed(&mut self, line: &str) -> Option<ProgressEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if summary::is_summary_line(line) {
            self.feed_summary(line);
            return None;
        }

        match progress::recognize(line)? {
            ProgressLine::Transfer {
                downloaded_bytes,
                total_bytes,
            } => Some(ProgressEvent::Downloading {
                downloaded_bytes,
                total_bytes,
                filename: self.filepath.clone(),
            }),
            ProgressLine::Destination(path)
            | ProgressLine::AlreadyDownloaded(path)
            | ProgressLine::Merging(path) => {
                self.filepath = Some(path);
                None
            }
        }
    }

    fn feed_summary(&mut self, line: &str) {
        match summary::parse(line) {
            Ok(parsed) => {
                if let Some(path) = parsed.filepath {
                    self.filepath = Some(path);
                }
                self.summary = Some(parsed.metadata);
            }
            Err(_e) => {
                self.malformed_summaries += 1;

                #[cfg(feature = "tracing")]
                tracing::warn!("Skipping malformed summary line: {}", _e);
            }
        }
    }

    /// Returns the best-known output file.
    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// Returns the metadata of the parsed summary, if one was seen.
    pub fn summary(&self) -> Option<&VideoMetadata> {
        self.summary.as_ref()
    }

    /// Returns the number of summary lines that were skipped as malformed.
    pub fn malformed_summaries(&self) -> usize {
        self.malformed_summaries
    }

    /// Consumes the parser, returning the summary metadata and the output file.
    pub fn into_parts(self) -> (Option<VideoMetadata>, Option<PathBuf>) {
        (self.summary, self.filepath)
    }
}
