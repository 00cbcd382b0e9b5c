//! File name rules for stored videos

use chrono::Utc;

const MAX_FILENAME_LENGTH: usize = 255;

/// Name used when the client sends a file part without a file name
pub fn fallback_filename() -> String {
    format!("video_{}.mp4", Utc::now().timestamp_millis())
}

/// True when `filename` is a single plain path component
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename.len() <= MAX_FILENAME_LENGTH
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\', '\0'])
}

/// True when `filename` ends with one of `extensions` (case-sensitive, e.g. ".mp4")
pub fn has_video_extension(filename: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| filename.ends_with(ext.as_str()))
}

/// MIME type reported on download
pub fn content_type_for(filename: &str) -> &'static str {
    if filename.ends_with(".mp4") {
        "video/mp4"
    } else if filename.ends_with(".webm") {
        "video/webm"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_filename_shape() {
        let name = fallback_filename();
        assert!(name.starts_with("video_"));
        assert!(name.ends_with(".mp4"));
        let millis = &name["video_".len()..name.len() - ".mp4".len()];
        assert!(millis.parse::<i64>().unwrap() > 1_600_000_000_000);
    }

    #[test]
    fn test_safe_filenames() {
        assert!(is_safe_filename("clip1.mp4"));
        assert!(is_safe_filename("my video (2).webm"));
        assert!(is_safe_filename(".hidden.mp4"));
        assert!(is_safe_filename("a..b.mp4"));
    }

    #[test]
    fn test_unsafe_filenames() {
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("."));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("sub/clip.mp4"));
        assert!(!is_safe_filename("..\\clip.mp4"));
        assert!(!is_safe_filename("clip\0.mp4"));
        assert!(!is_safe_filename(&"a".repeat(256)));
    }

    #[test]
    fn test_video_extension_filter() {
        let exts = vec![".mp4".to_string(), ".webm".to_string()];
        assert!(has_video_extension("a.mp4", &exts));
        assert!(has_video_extension("a.webm", &exts));
        assert!(!has_video_extension("a.mov", &exts));
        assert!(!has_video_extension("a.mp4.part", &exts));
        assert!(!has_video_extension("a.MP4", &exts));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.mp4"), "video/mp4");
        assert_eq!(content_type_for("a.webm"), "video/webm");
        assert_eq!(content_type_for("a.txt"), "application/octet-stream");
    }
}
