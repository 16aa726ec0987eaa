//! Quality presets and the 'yt-dlp' format selectors they stand for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents the quality presets offered to the user.
///
/// Every preset prefers an mp4 video stream merged with an m4a audio stream, and falls back to
/// the best single file when no such pair exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Best available quality
    #[default]
    Best,
    /// Up to 1080p
    #[serde(rename = "1080p")]
    P1080,
    /// Up to 720p
    #[serde(rename = "720p")]
    P720,
    /// Up to 480p
    #[serde(rename = "480p")]
    P480,
    /// Up to 360p
    #[serde(rename = "360p")]
    P360,
    /// Audio stream only
    #[serde(rename = "audio")]
    AudioOnly,
}

impl Quality {
    /// All presets, best first.
    pub const ALL: [Quality; 6] = [
        Quality::Best,
        Quality::P1080,
        Quality::P720,
        Quality::P480,
        Quality::P360,
        Quality::AudioOnly,
    ];

    /// Returns the maximum height of the preset, `None` when unbounded or audio only.
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Quality::P1080 => Some(1080),
            Quality::P720 => Some(720),
            Quality::P480 => Some(480),
            Quality::P360 => Some(360),
            Quality::Best | Quality::AudioOnly => None,
        }
    }

    /// Returns the 'yt-dlp' format selector expression for this preset.
    pub fn format_selector(&self) -> String {
        match self {
            Quality::Best => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string(),
            Quality::AudioOnly => "bestaudio[ext=m4a]/bestaudio".to_string(),
            _ => {
                let height = self.max_height().unwrap_or_default();
                format!(
                    "bestvideo[height<={h}][ext=mp4]+bestaudio[ext=m4a]/best[height<={h}][ext=mp4]/best",
                    h = height
                )
            }
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Quality::Best => "best",
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::P360 => "360p",
            Quality::AudioOnly => "audio",
        };

        write!(f, "{}", name)
    }
}

/// Error returned when a quality name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown quality '{0}', expected one of: best, 1080p, 720p, 480p, 360p, audio")]
pub struct UnknownQuality(pub String);

impl FromStr for Quality {
    type Err = UnknownQuality;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(Quality::Best),
            "1080p" | "1080" => Ok(Quality::P1080),
            "720p" | "720" => Ok(Quality::P720),
            "480p" | "480" => Ok(Quality::P480),
            "360p" | "360" => Ok(Quality::P360),
            "audio" | "audio only" | "audio-only" => Ok(Quality::AudioOnly),
            _ => Err(UnknownQuality(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_match_presets() {
        assert_eq!(
            Quality::Best.format_selector(),
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best"
        );
        assert_eq!(
            Quality::P720.format_selector(),
            "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/best[height<=720][ext=mp4]/best"
        );
        assert_eq!(
            Quality::AudioOnly.format_selector(),
            "bestaudio[ext=m4a]/bestaudio"
        );
    }

    #[test]
    fn parses_and_displays() {
        for quality in Quality::ALL {
            assert_eq!(quality.to_string().parse::<Quality>(), Ok(quality));
        }
        assert_eq!("Audio Only".parse::<Quality>(), Ok(Quality::AudioOnly));
        assert!("4k".parse::<Quality>().is_err());
    }

    #[test]
    fn serde_names_match_display() {
        let encoded = serde_json::to_string(&Quality::P1080).unwrap();
        assert_eq!(encoded, "\"1080p\"");
        let decoded: Quality = serde_json::from_str("\"audio\"").unwrap();
        assert_eq!(decoded, Quality::AudioOnly);
    }
}
