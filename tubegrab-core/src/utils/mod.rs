//! Utility functions and helpers shared by the fetchers.

pub mod file_system;

/// Converts a list of borrowed arguments into owned strings.
pub fn to_owned(args: Vec<impl AsRef<str>>) -> Vec<String> {
    args.iter().map(|arg| arg.as_ref().to_string()).collect()
}

/// Returns the platform-specific file name of an executable, e.g. 'yt-dlp.exe' on Windows.
pub fn find_executable(name: impl AsRef<str>) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.exe", name.as_ref())
    } else {
        name.as_ref().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owns_arguments() {
        let args = to_owned(vec!["--newline", "--no-playlist"]);
        assert_eq!(args, vec!["--newline".to_string(), "--no-playlist".to_string()]);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn executable_name_is_unchanged_off_windows() {
        assert_eq!(find_executable("yt-dlp"), "yt-dlp");
    }
}
