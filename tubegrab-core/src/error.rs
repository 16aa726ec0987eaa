//! The errors that can occur.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The possible errors that can occur.
///
/// Parsing anomalies inside the tool output (a bad progress line, a malformed summary line,
/// a format entry with odd fields) are never reported here: they are logged and skipped.
#[derive(Debug, Error)]
pub enum Error {
    /// The URL is not a recognized video URL. The tool was not invoked.
    #[error("Not a recognized video URL: {0}")]
    InvalidUrl(String),
    /// The tool exited successfully but printed nothing.
    #[error("The downloader produced no output")]
    EmptyOutput,
    /// The metadata printed by the tool is not valid JSON.
    #[error("Failed to parse the downloader output as JSON: {source}")]
    Parse {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The tool reported a failure while fetching metadata.
    #[error("The downloader failed with code {code}: {output}")]
    Tool {
        /// The exit code of the tool, -1 when it was killed by a signal.
        code: i32,
        /// The combined stdout and stderr of the tool.
        output: String,
    },
    /// The tool exited abnormally while downloading.
    #[error("The downloader exited with code {code}")]
    ToolExit {
        /// The exit code of the tool, -1 when it was killed by a signal.
        code: i32,
    },
    /// The download finished but no output file could be identified.
    #[error("The download produced no identifiable output file")]
    NoOutputFile,
    /// The output file was identified but does not exist on disk.
    #[error("File not found after download: {0}")]
    FileNotFoundAfterDownload(PathBuf),
    /// The tool could not be started.
    #[error("Failed to start {executable}: {source}")]
    ProcessSpawn {
        /// The executable that was launched.
        executable: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// An error occurred while interacting with the file system.
    #[error("An IO error occurred: {0}")]
    IO(#[from] std::io::Error),
    /// The tool did not finish in time and was killed.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// The kind of an [`Error`], without its payload.
///
/// Callers present one message per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUrl,
    EmptyOutput,
    Parse,
    Tool,
    ToolExit,
    NoOutputFile,
    FileNotFoundAfterDownload,
    ProcessSpawn,
    IO,
    Timeout,
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Error::EmptyOutput => ErrorKind::EmptyOutput,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::Tool { .. } => ErrorKind::Tool,
            Error::ToolExit { .. } => ErrorKind::ToolExit,
            Error::NoOutputFile => ErrorKind::NoOutputFile,
            Error::FileNotFoundAfterDownload(_) => ErrorKind::FileNotFoundAfterDownload,
            Error::ProcessSpawn { .. } => ErrorKind::ProcessSpawn,
            Error::IO(_) => ErrorKind::IO,
            Error::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidUrl => "invalid-url",
            ErrorKind::EmptyOutput => "empty-output",
            ErrorKind::Parse => "parse-error",
            ErrorKind::Tool => "tool-error",
            ErrorKind::ToolExit => "tool-exit-error",
            ErrorKind::NoOutputFile => "no-output-file",
            ErrorKind::FileNotFoundAfterDownload => "file-not-found-after-download",
            ErrorKind::ProcessSpawn => "process-spawn-error",
            ErrorKind::IO => "io-error",
            ErrorKind::Timeout => "timeout",
        };

        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_drops_the_payload() {
        let err = Error::Tool {
            code: 1,
            output: "ERROR: Video unavailable".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Tool);
        assert_eq!(err.kind().to_string(), "tool-error");

        let err = Error::FileNotFoundAfterDownload(PathBuf::from("/tmp/x.mp4"));
        assert_eq!(err.kind(), ErrorKind::FileNotFoundAfterDownload);
    }

    #[test]
    fn tool_error_message_carries_output() {
        let err = Error::Tool {
            code: 2,
            output: "usage: yt-dlp".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The downloader failed with code 2: usage: yt-dlp"
        );
    }
}
