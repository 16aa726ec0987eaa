//! Downloading a video while streaming its progress.

use crate::error::{Error, Result};
use crate::executor::RunningProcess;
use crate::fetcher::OUTPUT_TEMPLATE;
use crate::model::{DownloadResult, ProgressEvent, VideoMetadata};
use crate::parser::OutputParser;
use crate::utils::file_system;
use crate::{Downloader, utils};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

impl Downloader {
    /// Downloads the video at the given URL into the destination directory.
    ///
    /// The destination directory is created if missing. The file is named after the video
    /// title, restricted to portable characters. Progress events are passed to `on_progress`
    /// in order, on the task running this future, and a final
    /// [`ProgressEvent::Finished`] is sent once the tool exited cleanly.
    ///
    /// When the tool printed no JSON summary, the returned metadata is derived from the file
    /// name and [`DownloadResult::fallback`] is set.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL of the video.
    /// * `destination` - The directory to download into.
    /// * `format_selector` - The 'yt-dlp' format selector, see [`Quality`](crate::Quality).
    /// * `on_progress` - Called with every progress event.
    ///
    /// # Errors
    ///
    /// - [`Error::IO`] if the destination directory could not be created.
    /// - [`Error::ProcessSpawn`] if the tool could not be started.
    /// - [`Error::ToolExit`] if the tool exited abnormally.
    /// - [`Error::NoOutputFile`] if no output file could be identified.
    /// - [`Error::FileNotFoundAfterDownload`] if the output file does not exist.
    /// - [`Error::Timeout`] if a download timeout is set and expired.
    ///
    /// In every error case the process is no longer running when this function returns.
    ///
    /// # Examples
    ///
    /// ```rust, no_run
    /// # use tubegrab_core::{Downloader, ProgressEvent, Quality};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = Downloader::default();
    ///
    /// let result = downloader
    ///     .download(
    ///         "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
    ///         "output",
    ///         &Quality::P720.format_selector(),
    ///         |event: ProgressEvent| println!("{}", event),
    ///     )
    ///     .await?;
    /// println!("{} saved to {}", result.metadata.title, result.filepath.display());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download<F>(
        &self,
        url: &str,
        destination: impl AsRef<Path>,
        format_selector: &str,
        mut on_progress: F,
    ) -> Result<DownloadResult>
    where
        F: FnMut(ProgressEvent),
    {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Downloading {} into {:?} with format {}",
            url,
            destination.as_ref(),
            format_selector
        );

        file_system::create_dir(destination.as_ref()).await?;
        let destination = tokio::fs::canonicalize(destination.as_ref()).await?;

        let template = destination.join(OUTPUT_TEMPLATE);
        let template = template.to_string_lossy().into_owned();
        let args = vec![
            "--format",
            format_selector,
            "--newline",
            "--progress",
            "--no-playlist",
            "--output",
            template.as_str(),
            "--print-json",
            "--restrict-filenames",
            url,
        ];

        let mut process = self
            .executor(utils::to_owned(args), self.download_timeout)
            .stream()?;

        let deadline = self
            .download_timeout
            .map(|timeout| (Instant::now() + timeout, timeout));

        let mut parser = OutputParser::new();
        let code = match drive(&mut process, &mut parser, deadline, &mut on_progress).await {
            Ok(code) => code,
            Err(e) => {
                process.terminate().await;
                return Err(e);
            }
        };

        if code != 0 {
            #[cfg(feature = "tracing")]
            tracing::warn!("yt-dlp exited with code {} while downloading {}", code, url);

            process.terminate().await;
            return Err(Error::ToolExit { code });
        }

        let (summary, filepath) = parser.into_parts();
        let filepath = filepath.map(|path| file_system::absolute_from(path, &destination));

        if let Some(filepath) = &filepath {
            on_progress(ProgressEvent::Finished {
                filename: filepath.clone(),
            });
        }

        let Some(filepath) = filepath else {
            #[cfg(feature = "tracing")]
            tracing::warn!("yt-dlp finished without naming an output file");

            return Err(Error::NoOutputFile);
        };

        let fallback = summary.is_none();
        let metadata = summary.unwrap_or_else(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!("No summary printed, deriving metadata from {:?}", filepath);

            VideoMetadata::from_file_name(&filepath)
        });

        if !file_system::file_exists(&filepath).await {
            #[cfg(feature = "tracing")]
            tracing::warn!("Output file {:?} does not exist", filepath);

            return Err(Error::FileNotFoundAfterDownload(filepath));
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Downloaded {} to {:?}", metadata.title, filepath);

        Ok(DownloadResult::new(metadata, filepath, fallback))
    }
}

/// Feeds every line of output to the parser, then waits for the exit code.
async fn drive<F>(
    process: &mut RunningProcess,
    parser: &mut OutputParser,
    deadline: Option<(Instant, Duration)>,
    on_progress: &mut F,
) -> Result<i32>
where
    F: FnMut(ProgressEvent),
{
    while let Some(line) = within(deadline, process.next_line()).await? {
        #[cfg(feature = "tracing")]
        tracing::trace!("yt-dlp: {}", line);

        if let Some(event) = parser.feed(&line) {
            on_progress(event);
        }
    }

    within(deadline, process.wait()).await?
}

async fn within<T>(
    deadline: Option<(Instant, Duration)>,
    future: impl Future<Output = T>,
) -> Result<T> {
    match deadline {
        Some((at, timeout)) => tokio::time::timeout_at(at, future)
            .await
            .map_err(|_| Error::Timeout(timeout)),
        None => Ok(future.await),
    }
}
