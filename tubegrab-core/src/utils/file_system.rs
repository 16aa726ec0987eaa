//! Tools for working with the file system.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Splits the file name of the given path into its stem and extension.
///
/// Only the last dot separates the extension, so 'my.video.mp4' gives ('my.video', 'mp4').
/// Both parts are empty strings when absent.
pub fn split_file_name(path: impl AsRef<Path>) -> (String, String) {
    let path = path.as_ref();

    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default();

    (stem, extension)
}

/// Creates a new directory at the given destination.
/// If the directory already exists, nothing is done.
///
/// # Arguments
///
/// * `destination` - The path to create the directory at.
pub async fn create_dir(destination: impl AsRef<Path>) -> Result<()> {
    tokio::fs::create_dir_all(destination).await?;
    Ok(())
}

/// Makes the given path absolute, resolving it against `base` when it is relative.
///
/// The path is not required to exist, and symbolic links are not resolved.
pub fn absolute_from(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.as_ref().join(path)
    }
}

/// Returns true if a regular file exists at the given path.
pub async fn file_exists(path: impl AsRef<Path>) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata.is_file(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_dot() {
        assert_eq!(
            split_file_name("/tmp/my.video.mp4"),
            ("my.video".to_string(), "mp4".to_string())
        );
        assert_eq!(
            split_file_name("noext"),
            ("noext".to_string(), String::new())
        );
    }

    #[test]
    fn resolves_relative_paths() {
        assert_eq!(
            absolute_from("clip.mp4", "/downloads"),
            PathBuf::from("/downloads/clip.mp4")
        );
        assert_eq!(
            absolute_from("/elsewhere/clip.mp4", "/downloads"),
            PathBuf::from("/elsewhere/clip.mp4")
        );
    }

    #[tokio::test]
    async fn creates_nested_directories_idempotently() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");

        create_dir(&nested).await.unwrap();
        create_dir(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert!(!file_exists(&nested).await);
    }
}
