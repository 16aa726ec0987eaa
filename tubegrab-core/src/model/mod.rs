//! The models used to represent the data printed by 'yt-dlp'.
//!
//! The tool output is loosely typed and changes between releases, so every field is read
//! separately from the JSON value and normalized into [`VideoMetadata`] and [`AvailableFormat`].

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod format_selector;
pub mod progress;

pub use format_selector::Quality;
pub use progress::ProgressEvent;

/// The title used when the tool does not report one.
pub const UNKNOWN_TITLE: &str = "Unknown title";
/// The uploader used when the tool does not report one.
pub const UNKNOWN_UPLOADER: &str = "Unknown uploader";

/// Represents a video, normalized from the JSON printed by 'yt-dlp'.
///
/// Produced fresh for every fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// The ID of the video.
    pub id: String,
    /// The title of the video.
    pub title: String,
    /// The duration of the video, in seconds.
    pub duration: u64,
    /// The duration formatted as `H:MM:SS`, or `M:SS` under an hour.
    pub duration_string: String,
    /// The thumbnail URL of the video, may be empty.
    pub thumbnail: String,
    /// The display name of the uploader.
    pub uploader: String,
    /// The upload date as printed by the tool, e.g. '20240131'.
    pub upload_date: String,
    /// The container extension of the downloaded file, empty when unknown.
    pub extension: String,
    /// The available formats, when the tool listed them.
    pub formats: Option<Vec<AvailableFormat>>,
}

/// Represents a downloadable format of a video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailableFormat {
    /// The format identifier, e.g. '137'.
    pub format_id: String,
    /// The container extension, e.g. 'mp4'.
    pub ext: String,
    /// The width in pixels, 0 for audio-only formats.
    pub width: u32,
    /// The height in pixels, 0 for audio-only formats.
    pub height: u32,
    /// The resolution, `{width}x{height}`.
    pub resolution: String,
    /// The file size in bytes, 0 if unknown.
    pub filesize: u64,
}

/// The outcome of a successful download.
#[derive(Constructor, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadResult {
    /// The metadata of the downloaded video.
    pub metadata: VideoMetadata,
    /// The absolute path of the downloaded file, verified to exist when returned.
    pub filepath: PathBuf,
    /// True when the tool printed no summary and the metadata was derived from the file name.
    pub fallback: bool,
}

impl AvailableFormat {
    /// Creates a format, deriving its resolution.
    pub fn new(
        format_id: impl Into<String>,
        ext: impl Into<String>,
        width: u32,
        height: u32,
        filesize: u64,
    ) -> Self {
        Self {
            format_id: format_id.into(),
            ext: ext.into(),
            width,
            height,
            resolution: format!("{}x{}", width, height),
            filesize,
        }
    }

    /// Returns true if the format carries no picture.
    pub fn is_audio_only(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

impl VideoMetadata {
    /// Normalizes the JSON document printed by the tool.
    ///
    /// Only a whitelist of fields is kept. Each field is read on its own: a missing or mistyped
    /// field falls back to its default without affecting the others, and format entries that
    /// are not objects are skipped.
    pub fn from_info_json(info: Value) -> Self {
        if !info.is_object() {
            #[cfg(feature = "tracing")]
            tracing::warn!("Unexpected shape of the video information: {}", info);
        }

        let duration = number(&info, "duration")
            .filter(|d| *d > 0.0)
            .map(|d| d as u64)
            .unwrap_or(0);

        let formats = info
            .get("formats")
            .and_then(Value::as_array)
            .filter(|formats| !formats.is_empty())
            .map(|formats| formats.iter().filter_map(read_format).collect());

        Self {
            id: text(&info, "id").unwrap_or_default(),
            title: text(&info, "title").unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            duration,
            duration_string: format_duration(duration),
            thumbnail: text(&info, "thumbnail").unwrap_or_default(),
            uploader: text(&info, "uploader").unwrap_or_else(|| UNKNOWN_UPLOADER.to_string()),
            upload_date: text(&info, "upload_date").unwrap_or_default(),
            extension: text(&info, "ext").unwrap_or_default(),
            formats,
        }
    }

    /// Builds a reduced record from the downloaded file name alone.
    ///
    /// The title is the file name without its extension, the extension is its suffix.
    pub fn from_file_name(path: impl AsRef<Path>) -> Self {
        let (title, extension) = crate::utils::file_system::split_file_name(path);

        Self {
            id: String::new(),
            title,
            duration: 0,
            duration_string: format_duration(0),
            thumbnail: String::new(),
            uploader: UNKNOWN_UPLOADER.to_string(),
            upload_date: String::new(),
            extension,
            formats: None,
        }
    }
}

/// Formats a duration in seconds as `H:MM:SS` when it reaches an hour, else `M:SS`.
///
/// # Examples
///
/// ```rust
/// # use tubegrab_core::model::format_duration;
/// assert_eq!(format_duration(3725), "1:02:05");
/// assert_eq!(format_duration(45), "0:45");
/// ```
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn read_format(value: &Value) -> Option<AvailableFormat> {
    if !value.is_object() {
        #[cfg(feature = "tracing")]
        tracing::debug!("Skipping unreadable format entry: {}", value);

        return None;
    }

    let dimension = |key: &str| {
        number(value, key)
            .filter(|n| *n > 0.0)
            .map(|n| n.min(u32::MAX as f64) as u32)
            .unwrap_or(0)
    };

    let filesize = number(value, "filesize")
        .filter(|size| *size > 0.0)
        .map(|size| size as u64)
        .unwrap_or(0);

    Some(AvailableFormat::new(
        text(value, "format_id").unwrap_or_default(),
        text(value, "ext").unwrap_or_default(),
        dimension("width"),
        dimension("height"),
        filesize,
    ))
}

/// Reads a text field. Numbers are kept as their decimal text, other types are ignored.
fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => None,
        _other => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Ignoring field {} of unexpected type: {}", key, _other);

            None
        }
    }
}

/// Reads a finite numeric field, integer or not.
fn number(value: &Value, key: &str) -> Option<f64> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
}

impl fmt::Display for VideoMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Video(id={}, title={}, duration={})",
            self.id, self.title, self.duration_string
        )
    }
}

impl fmt::Display for AvailableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Format(id={}, ext={}, resolution={})",
            self.format_id, self.ext, self.resolution
        )
    }
}
