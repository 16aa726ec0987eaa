//! A download session: validate, fetch, download, then record in the history.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tubegrab_core::model::UNKNOWN_TITLE;
use tubegrab_core::{DownloadResult, Downloader, ProgressEvent, Quality, VideoMetadata};

/// Runs one download at a time and keeps the history up to date.
#[derive(Debug)]
pub struct Session {
    downloader: Downloader,
    download_dir: PathBuf,
    history: Mutex<HistoryStore>,
    in_flight: AtomicBool,
}

/// Marks a download as running until dropped.
#[derive(Debug)]
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Busy)?;

        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Session {
    pub fn new(
        downloader: Downloader,
        download_dir: impl Into<PathBuf>,
        history: HistoryStore,
    ) -> Self {
        Self {
            downloader,
            download_dir: download_dir.into(),
            history: Mutex::new(history),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Creates a session from the configuration, opening its history file.
    pub fn from_config(config: &Config) -> Result<Self> {
        let history = HistoryStore::open_default(config)?;

        Ok(Self::new(
            config.downloader(),
            &config.download_dir,
            history,
        ))
    }

    pub fn downloader(&self) -> &Downloader {
        &self.downloader
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Returns true if the URL is a recognized video URL.
    pub fn check_url(&self, url: &str) -> bool {
        tubegrab_core::is_valid(url)
    }

    /// Fetches the metadata of the video, without downloading it.
    pub async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        Ok(self.downloader.fetch_metadata(url).await?)
    }

    /// Returns true while a download runs.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Locks the history.
    pub fn history(&self) -> MutexGuard<'_, HistoryStore> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Downloads the video into the download directory and records it in the history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if another download of this session is running, or the failure
    /// of the download. Nothing is recorded on failure.
    pub async fn download<F>(
        &self,
        url: &str,
        quality: Quality,
        on_progress: F,
    ) -> Result<DownloadResult>
    where
        F: FnMut(ProgressEvent),
    {
        let _guard = InFlight::acquire(&self.in_flight)?;

        if !self.check_url(url) {
            return Err(tubegrab_core::Error::InvalidUrl(url.to_string()).into());
        }

        info!("Downloading {} in {} quality", url, quality);
        let result = self
            .downloader
            .download(
                url,
                &self.download_dir,
                &quality.format_selector(),
                on_progress,
            )
            .await?;

        if result.fallback {
            debug!("No summary for {}, metadata derived from the file name", url);
        }

        let title = if result.metadata.title.trim().is_empty() {
            UNKNOWN_TITLE
        } else {
            result.metadata.title.as_str()
        };
        self.history().add(
            title,
            url,
            &result.filepath,
            result.metadata.thumbnail.as_str(),
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn guard_is_exclusive_and_released() {
        let flag = AtomicBool::new(false);

        let guard = InFlight::acquire(&flag).unwrap();
        assert_matches!(InFlight::acquire(&flag), Err(Error::Busy));

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(InFlight::acquire(&flag).is_ok());
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_and_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(
            Downloader::new("/nonexistent/yt-dlp"),
            dir.path(),
            HistoryStore::open(dir.path().join("history.json")),
        );

        let result = session.download("not a url", Quality::Best, |_| {}).await;

        assert_matches!(
            result,
            Err(Error::Core(tubegrab_core::Error::InvalidUrl(_)))
        );
        assert!(!session.is_busy());
        assert!(session.history().is_empty());
    }
}
