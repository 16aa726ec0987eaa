//! Recognizer for the JSON summary printed by 'yt-dlp' with `--print-json`.

use crate::model::VideoMetadata;
use serde_json::Value;
use std::path::PathBuf;

/// The parsed summary of a finished download.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// The normalized metadata of the video.
    pub metadata: VideoMetadata,
    /// The output file, when the summary names one.
    pub filepath: Option<PathBuf>,
}

/// Returns true if the line is shaped like a single JSON object.
pub fn is_summary_line(line: &str) -> bool {
    line.starts_with('{') && line.ends_with('}')
}

/// Parses a summary line.
///
/// The output file is read from the first requested download, then from the top-level
/// `_filename` and `filename` fields.
///
/// # Errors
///
/// This function will return an error if the line is not valid JSON.
pub fn parse(line: &str) -> serde_json::Result<Summary> {
    let info: Value = serde_json::from_str(line)?;
    let filepath = output_file(&info);

    Ok(Summary {
        metadata: VideoMetadata::from_info_json(info),
        filepath,
    })
}

fn output_file(info: &Value) -> Option<PathBuf> {
    let requested = info
        .get("requested_downloads")
        .and_then(|downloads| downloads.get(0))
        .and_then(|download| download.get("filepath"));

    [requested, info.get("_filename"), info.get("filename")]
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|path| !path.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_requested_downloads() {
        let summary = parse(
            r#"{"id":"abc","title":"Clip","ext":"mp4","requested_downloads":[{"filepath":"/out/Clip.mp4"}],"_filename":"/out/Clip.f22.mp4"}"#,
        )
        .unwrap();

        assert_eq!(summary.filepath, Some(PathBuf::from("/out/Clip.mp4")));
        assert_eq!(summary.metadata.title, "Clip");
        assert_eq!(summary.metadata.extension, "mp4");
    }

    #[test]
    fn falls_back_to_filename_fields() {
        let summary = parse(r#"{"title":"Clip","requested_downloads":[{}],"_filename":"/out/Clip.webm"}"#)
            .unwrap();
        assert_eq!(summary.filepath, Some(PathBuf::from("/out/Clip.webm")));

        let summary = parse(r#"{"title":"Clip","filename":"/out/Clip.mkv"}"#).unwrap();
        assert_eq!(summary.filepath, Some(PathBuf::from("/out/Clip.mkv")));

        let summary = parse(r#"{"title":"Clip","requested_downloads":[{"filepath":""}]}"#).unwrap();
        assert_eq!(summary.filepath, None);
    }

    #[test]
    fn detects_object_lines() {
        assert!(is_summary_line(r#"{"a":1}"#));
        assert!(!is_summary_line("[download] {not json}x"));
        assert!(!is_summary_line("[1, 2]"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse("{not json}").is_err());
    }
}
