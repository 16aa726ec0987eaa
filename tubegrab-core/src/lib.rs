#![doc = include_str!("../README.md")]

use crate::error::Result;
use crate::executor::Executor;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod error;
pub mod executor;
pub mod fetcher;
pub mod model;
pub mod parser;
pub mod url;
pub mod utils;

pub use error::{Error, ErrorKind};
pub use model::{AvailableFormat, DownloadResult, ProgressEvent, Quality, VideoMetadata};
pub use url::is_valid;

/// The default timeout for metadata lookups.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A video downloader driving the 'yt-dlp' executable.
///
/// Every call spawns its own process and keeps its own parse state, so one handle can be
/// shared between tasks, as long as concurrent downloads write to distinct files.
///
/// The major implementations of this struct are located in the 'fetcher' module.
///
/// # Examples
///
/// ```rust, no_run
/// # use tubegrab_core::Downloader;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = Downloader::new("yt-dlp");
///
/// let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
/// let video = downloader.fetch_metadata(url).await?;
/// println!("Video title: {}", video.title);
///
/// let result = downloader
///     .download(url, "output", "best", |event| println!("{}", event))
///     .await?;
/// println!("Saved to {}", result.filepath.display());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Downloader {
    /// The path to the 'yt-dlp' executable.
    pub executable: PathBuf,
    /// The arguments passed to 'yt-dlp' before the ones of each operation.
    pub args: Vec<String>,
    /// The timeout for metadata lookups.
    pub timeout: Duration,
    /// The timeout for downloads, `None` waits as long as the tool runs.
    pub download_timeout: Option<Duration>,
}

impl fmt::Display for Downloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Downloader: executable={:?}, args={:?}",
            self.executable, self.args
        )
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new(utils::find_executable("yt-dlp"))
    }
}

impl Downloader {
    /// Creates a new downloader using the given 'yt-dlp' executable.
    ///
    /// A bare name is looked up in `PATH` when the process is spawned.
    ///
    /// # Arguments
    ///
    /// * `executable` - The path or name of the 'yt-dlp' executable.
    pub fn new(executable: impl AsRef<Path>) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!("Creating a new downloader for {:?}", executable.as_ref());

        Self {
            executable: executable.as_ref().to_path_buf(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            download_timeout: None,
        }
    }

    /// Adds arguments passed to 'yt-dlp' on every invocation.
    ///
    /// # Arguments
    ///
    /// * `args` - The arguments to pass to yt-dlp.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use tubegrab_core::Downloader;
    /// let mut downloader = Downloader::new("yt-dlp");
    ///
    /// let args = vec!["--no-mtime".to_string()];
    /// downloader.with_args(args);
    /// ```
    pub fn with_args(&mut self, mut args: Vec<String>) -> &mut Self {
        self.args.append(&mut args);
        self
    }

    /// Adds an argument passed to 'yt-dlp' on every invocation.
    ///
    /// # Arguments
    ///
    /// * `arg` - The argument to pass to yt-dlp.
    pub fn with_arg(&mut self, arg: impl AsRef<str>) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Sets the timeout for metadata lookups.
    ///
    /// # Arguments
    ///
    /// * `timeout` - The timeout duration for metadata lookups.
    pub fn with_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout for downloads. On expiry the process is killed.
    ///
    /// # Arguments
    ///
    /// * `timeout` - The timeout duration for downloads, `None` to wait forever.
    pub fn with_download_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.download_timeout = timeout;
        self
    }

    /// Returns the version printed by 'yt-dlp'.
    ///
    /// # Errors
    ///
    /// This function will return an error if the executable could not be run, or exited abnormally.
    ///
    /// # Examples
    ///
    /// ```rust, no_run
    /// # use tubegrab_core::Downloader;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = Downloader::default();
    /// println!("yt-dlp {}", downloader.version().await?);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn version(&self) -> Result<String> {
        let output = self
            .executor(utils::to_owned(vec!["--version"]), Some(self.timeout))
            .execute()
            .await?;

        if !output.success() {
            return Err(Error::Tool {
                code: output.code,
                output: output.combined(),
            });
        }

        Ok(output.stdout.trim().to_string())
    }

    pub(crate) fn executor(&self, mut args: Vec<String>, timeout: Option<Duration>) -> Executor {
        let mut final_args = self.args.clone();
        final_args.append(&mut args);

        Executor {
            executable_path: self.executable.clone(),
            timeout,
            args: final_args,
        }
    }
}
