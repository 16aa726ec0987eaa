#![cfg(unix)]

use assert_matches::assert_matches;
use std::path::PathBuf;
use tempfile::TempDir;
use tubegrab::{Error, HistoryStatus, HistoryStore, Session};
use tubegrab_core::{Downloader, Quality};

const URL: &str = "https://youtu.be/AAAAAAAAAAA";

/// A fake 'yt-dlp' writing `Clip.mp4` into the directory of the `--output` template.
const FAKE_TOOL: &str = r#"
for arg in "$@"; do
  if [ "$prev" = "--output" ]; then out="$arg"; fi
  prev="$arg"
done
dir=$(dirname "$out")
sleep "${DELAY:-0}"
echo "[download] Destination: $dir/Clip.mp4"
echo "[download] 100% of 1.00KiB"
printf 'x' > "$dir/Clip.mp4"
echo '{"title":"'"$TITLE"'","thumbnail":"https://i.ytimg.com/clip.jpg","requested_downloads":[{"filepath":"'"$dir"'/Clip.mp4"}]}'
"#;

fn session(root: &TempDir, delay: &str) -> Session {
    session_titled(root, delay, "Clip")
}

fn session_titled(root: &TempDir, delay: &str, title: &str) -> Session {
    let script = root.path().join("fake-yt-dlp.sh");
    std::fs::write(
        &script,
        format!("DELAY={}\nTITLE='{}'\n{}", delay, title, FAKE_TOOL),
    )
    .unwrap();

    let mut downloader = Downloader::new("/bin/sh");
    downloader.with_arg(script.to_string_lossy());

    Session::new(
        downloader,
        root.path().join("downloads"),
        HistoryStore::open(root.path().join("history.json")),
    )
}

#[tokio::test]
async fn download_is_recorded() {
    let root = tempfile::tempdir().unwrap();
    let session = session(&root, "0");

    let result = session.download(URL, Quality::P720, |_| {}).await.unwrap();

    let expected: PathBuf = std::fs::canonicalize(root.path().join("downloads"))
        .unwrap()
        .join("Clip.mp4");
    assert_eq!(result.filepath, expected);

    let mut history = session.history();
    let entries = history.list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Clip");
    assert_eq!(entries[0].url, URL);
    assert_eq!(entries[0].filepath, expected);
    assert_eq!(entries[0].thumbnail, "https://i.ytimg.com/clip.jpg");
    assert_eq!(entries[0].size, "1.00 B");
    assert_eq!(entries[0].status, HistoryStatus::Completed);
}

#[tokio::test]
async fn blank_title_is_recorded_as_unknown() {
    let root = tempfile::tempdir().unwrap();
    let session = session_titled(&root, "0", "  ");

    session.download(URL, Quality::Best, |_| {}).await.unwrap();

    let mut history = session.history();
    assert_eq!(
        history.list()[0].title,
        tubegrab_core::model::UNKNOWN_TITLE
    );
}

#[tokio::test]
async fn one_download_at_a_time() {
    let root = tempfile::tempdir().unwrap();
    let session = session(&root, "1");

    let (first, second) = tokio::join!(
        session.download(URL, Quality::Best, |_| {}),
        session.download(URL, Quality::Best, |_| {}),
    );

    assert!(first.is_ok());
    assert_matches!(second, Err(Error::Busy));
    assert!(!session.is_busy());
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn failed_download_is_not_recorded() {
    let root = tempfile::tempdir().unwrap();
    let session = Session::new(
        Downloader::new("/nonexistent/yt-dlp"),
        root.path().join("downloads"),
        HistoryStore::open(root.path().join("history.json")),
    );

    let result = session.download(URL, Quality::Best, |_| {}).await;

    assert_matches!(
        result,
        Err(Error::Core(tubegrab_core::Error::ProcessSpawn { .. }))
    );
    assert!(!session.is_busy());
    assert!(session.history().is_empty());
}
