//! Recognition of video URLs.

use regex::Regex;
use std::sync::LazyLock;

/// Optional scheme, optional `www.`, a known host, one of the known path shapes, then an
/// 11-character video ID. Anchored at the start only, anything after the ID is tolerated.
const VIDEO_URL_PATTERN: &str = concat!(
    r"^(https?://)?(www\.)?",
    r"(youtube|youtu|youtube-nocookie)\.(com|be)/",
    r"(watch\?v=|embed/|v/|.+\?v=)?([^&=%\?]{11})",
);

static VIDEO_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VIDEO_URL_PATTERN).expect("video URL pattern is valid"));

/// Returns true if the given string looks like a video URL the downloader can handle.
///
/// # Examples
///
/// ```rust
/// # use tubegrab_core::is_valid;
/// assert!(is_valid("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
/// assert!(is_valid("https://youtu.be/dQw4w9WgXcQ"));
/// assert!(!is_valid("https://example.com/watch?v=dQw4w9WgXcQ"));
/// ```
pub fn is_valid(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    VIDEO_URL.is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=AAAAAAAAAAA",
            "https://youtu.be/AAAAAAAAAAA",
            "http://youtube.com/embed/AAAAAAAAAAA",
            "youtube.com/v/AAAAAAAAAAA",
            "https://www.youtube-nocookie.com/embed/AAAAAAAAAAA",
            "https://www.youtube.com/attribution_link?a=x&u=/watch?v=AAAAAAAAAAA",
        ] {
            assert!(is_valid(url), "{} should be valid", url);
        }
    }

    #[test]
    fn tolerates_trailing_content() {
        assert!(is_valid(
            "https://www.youtube.com/watch?v=AAAAAAAAAAA&list=PL123&t=42s"
        ));
        assert!(is_valid("https://youtu.be/AAAAAAAAAAA?si=tracking"));
    }

    #[test]
    fn rejects_everything_else() {
        for url in [
            "",
            "random text",
            "https://vimeo.com/123456789012",
            "https://example.com/watch?v=AAAAAAAAAAA",
            "https://www.youtube.com/watch?v=short",
            "ftp://youtube.com/watch?v=AAAAAAAAAAA",
            " https://youtu.be/AAAAAAAAAAA",
        ] {
            assert!(!is_valid(url), "{:?} should be invalid", url);
        }
    }
}
