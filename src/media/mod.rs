//! Media analysis: image description and video frame analysis.

mod image;
mod video;

pub use image::{to_data_url, ImageAnalyzer};
pub use video::{frame_timestamps, VideoAnalyzer};

/// Check whether a media source is a remote URL rather than a local path.
pub(crate) fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_detection() {
        assert!(is_remote("https://example.com/a.jpg"));
        assert!(is_remote("http://example.com/a.jpg"));
        assert!(!is_remote("/tmp/a.jpg"));
        assert!(!is_remote("clip.mp4"));
    }
}
