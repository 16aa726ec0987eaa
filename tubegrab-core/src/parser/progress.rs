//! Recognizer for the human-readable progress lines of 'yt-dlp'.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// The marker prefixing every line written by the downloader stage.
pub const DOWNLOAD_MARKER: &str = "[download]";
/// The marker prefixing lines of the stage merging video and audio streams.
pub const MERGER_MARKER: &str = "[Merger]";

static PERCENT_OF_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)%\s+of\s+~?\s*(\d+(?:\.\d+)?)\s*([A-Za-z]+)")
        .expect("progress pattern is valid")
});
static DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[download\]\s+Destination:\s+(.+)$").expect("destination pattern is valid")
});
static ALREADY_DOWNLOADED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[download\]\s+(.+?)\s+has already been downloaded")
        .expect("already downloaded pattern is valid")
});
static MERGING_INTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[Merger\]\s+Merging formats into\s+"(.+)""#).expect("merger pattern is valid")
});

/// A recognized progress line.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressLine {
    /// A transfer update, sizes in bytes.
    Transfer {
        /// The number of bytes downloaded so far.
        downloaded_bytes: f64,
        /// The total number of bytes.
        total_bytes: f64,
    },
    /// The downloader announced the file it writes to.
    Destination(PathBuf),
    /// The file was already present and the download was skipped.
    AlreadyDownloaded(PathBuf),
    /// The streams are being merged into this file.
    Merging(PathBuf),
}

/// Recognizes a progress line, returns `None` for anything else.
pub fn recognize(line: &str) -> Option<ProgressLine> {
    if line.contains(MERGER_MARKER) {
        return MERGING_INTO
            .captures(line)
            .map(|captures| ProgressLine::Merging(PathBuf::from(&captures[1])));
    }

    if !line.contains(DOWNLOAD_MARKER) {
        return None;
    }

    if let Some(captures) = DESTINATION.captures(line) {
        return Some(ProgressLine::Destination(PathBuf::from(captures[1].trim())));
    }

    if let Some(captures) = ALREADY_DOWNLOADED.captures(line) {
        return Some(ProgressLine::AlreadyDownloaded(PathBuf::from(&captures[1])));
    }

    let captures = PERCENT_OF_SIZE.captures(line)?;
    let percent = captures[1].parse::<f64>();
    let size = captures[2].parse::<f64>();

    match (percent, size) {
        (Ok(percent), Ok(size)) => {
            let total_bytes = size * unit_multiplier(&captures[3]);
            Some(ProgressLine::Transfer {
                downloaded_bytes: total_bytes * (percent / 100.0),
                total_bytes,
            })
        }
        _ => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Ignoring unreadable progress line: {}", line);

            None
        }
    }
}

/// Returns the number of bytes in one unit. Binary units only, any other token counts as bytes.
pub fn unit_multiplier(unit: &str) -> f64 {
    match unit {
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(line: &str) -> (f64, f64) {
        match recognize(line) {
            Some(ProgressLine::Transfer {
                downloaded_bytes,
                total_bytes,
            }) => (downloaded_bytes, total_bytes),
            other => panic!("expected a transfer for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn converts_binary_units() {
        let (downloaded, total) = transfer("[download]  42.5% of 123.40MiB at 2.00MiB/s ETA 00:59");
        let expected_total = 123.40 * 1024.0 * 1024.0;

        assert!((total - expected_total).abs() < 1e-6);
        assert!((downloaded - expected_total * 0.425).abs() < 1e-6);
    }

    #[test]
    fn tolerates_padding_and_estimates() {
        let (_, total) = transfer("[download]   3.0% of ~  10.00GiB at  1.5MiB/s ETA 1:00:00");
        assert!((total - 10.0 * 1024.0 * 1024.0 * 1024.0).abs() < 1e-3);

        let (downloaded, total) = transfer("[download] 100% of 512.00KiB in 00:00:01");
        assert!((total - 512.0 * 1024.0).abs() < 1e-9);
        assert!((downloaded - total).abs() < 1e-9);
    }

    #[test]
    fn unknown_units_count_as_bytes() {
        let (_, total) = transfer("[download]  50.0% of 900.00B at 10B/s");
        assert!((total - 900.0).abs() < 1e-9);
    }

    #[test]
    fn recognizes_file_announcements() {
        assert_eq!(
            recognize("[download] Destination: /tmp/out/My_Video.f137.mp4"),
            Some(ProgressLine::Destination(PathBuf::from(
                "/tmp/out/My_Video.f137.mp4"
            )))
        );
        assert_eq!(
            recognize("[download] /tmp/out/My_Video.mp4 has already been downloaded"),
            Some(ProgressLine::AlreadyDownloaded(PathBuf::from(
                "/tmp/out/My_Video.mp4"
            )))
        );
        assert_eq!(
            recognize(r#"[Merger] Merging formats into "/tmp/out/My_Video.mp4""#),
            Some(ProgressLine::Merging(PathBuf::from("/tmp/out/My_Video.mp4")))
        );
    }

    #[test]
    fn ignores_unrelated_lines() {
        for line in [
            "[youtube] dQw4w9WgXcQ: Downloading webpage",
            "[info] dQw4w9WgXcQ: Downloading 1 format(s): 22",
            "[download]  42.5% of Unknown size",
            "WARNING: 42.5% of 10.00MiB",
            "",
        ] {
            assert_eq!(recognize(line), None, "{:?}", line);
        }
    }
}
