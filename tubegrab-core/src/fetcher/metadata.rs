//! Fetching video metadata without downloading.

use crate::error::{Error, Result};
use crate::model::VideoMetadata;
use crate::{Downloader, url, utils};
use serde_json::{Map, Value};

impl Downloader {
    /// Fetch the metadata of the video at the given URL.
    ///
    /// Runs `yt-dlp --dump-json --no-playlist <url>` and normalizes the printed JSON. No file is
    /// written. Both streams are captured, but only stdout is read as JSON so that warnings
    /// printed on stderr do not break the parse.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL of the video, it must pass [`is_valid`](crate::is_valid).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if the URL is not recognized, the tool is not started.
    /// - [`Error::ProcessSpawn`] if the tool could not be started.
    /// - [`Error::Tool`] if the tool exited abnormally, with its output.
    /// - [`Error::EmptyOutput`] if the tool exited cleanly with nothing on stdout, even when it
    ///   printed warnings on stderr.
    /// - [`Error::Parse`] if stdout is not a JSON object.
    /// - [`Error::Timeout`] if the tool did not answer in time.
    ///
    /// # Examples
    ///
    /// ```rust, no_run
    /// # use tubegrab_core::Downloader;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = Downloader::default();
    ///
    /// let video = downloader
    ///     .fetch_metadata("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    ///     .await?;
    /// println!("{} ({})", video.title, video.duration_string);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        if !url::is_valid(url) {
            return Err(Error::InvalidUrl(url.to_string()));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Fetching metadata for {}", url);

        let args = vec!["--dump-json", "--no-playlist", url];
        let output = self
            .executor(utils::to_owned(args), Some(self.timeout))
            .execute()
            .await?;

        if !output.success() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "yt-dlp failed with code {} while fetching metadata: {}",
                output.code,
                output.stderr.trim()
            );

            return Err(Error::Tool {
                code: output.code,
                output: output.combined(),
            });
        }

        let stdout = output.stdout.trim();
        if stdout.is_empty() {
            return Err(Error::EmptyOutput);
        }

        let info: Map<String, Value> =
            serde_json::from_str(stdout).map_err(|source| Error::Parse { source })?;

        let video = VideoMetadata::from_info_json(Value::Object(info));

        #[cfg(feature = "tracing")]
        tracing::debug!("Fetched metadata: {}", video);

        Ok(video)
    }
}
