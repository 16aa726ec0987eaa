//! The operations of the [`Downloader`](crate::Downloader).
//!
//! This module is subdivided into one module per operation: [`metadata`] runs 'yt-dlp' in
//! info-only mode, [`download`] runs a download while streaming its progress.

pub mod download;
pub mod metadata;

/// The output template, relative to the destination directory.
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";
