use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Extensions rendered with a video element in the lightbox.
const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "webm", "ogg", "mov"];

/// Extension given to the poster frame of a video thumbnail.
const VIDEO_THUMB_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_filename(filename: &str) -> Self {
        if is_video(filename) {
            Self::Video
        } else {
            Self::Image
        }
    }
}

/// Extension after the last `.`, if any.
fn extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}

/// Check if a filename names a video by its extension (case-insensitive).
pub fn is_video(filename: &str) -> bool {
    extension(filename)
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|video| ext.eq_ignore_ascii_case(video))
        })
        .unwrap_or(false)
}

/// Thumbnail location for a media file.
///
/// Videos are represented by a still frame stored next to the image
/// thumbnails, so their extension is swapped for `.jpg`.
pub fn thumbnail_path(thumb_root: &Path, filename: &str) -> PathBuf {
    if is_video(filename) {
        let stem = filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(filename);
        thumb_root.join(format!("{stem}.{VIDEO_THUMB_EXTENSION}"))
    } else {
        thumb_root.join(filename)
    }
}

/// Full-resolution location for a media file.
pub fn media_path(media_root: &Path, filename: &str) -> PathBuf {
    media_root.join(filename)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub filename: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
}

impl MediaItem {
    pub fn new(filename: impl Into<String>, description: Option<String>, date: NaiveDateTime) -> Self {
        Self {
            filename: filename.into(),
            description,
            date,
        }
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_filename(&self.filename)
    }

    /// Description shown under the lightbox media; empty when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Accessible label and alt text: the description, else the filename.
    pub fn label(&self) -> &str {
        match self.description.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => &self.filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 14)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_is_video_extensions() {
        for name in ["clip.mp4", "CLIP.MP4", "a.webm", "a.ogg", "a.mov", "a.MoV"] {
            assert!(is_video(name), "{name} should be a video");
        }
        for name in ["photo.jpg", "photo.png", "README", "mp4", "clip.mp4.jpg"] {
            assert!(!is_video(name), "{name} should not be a video");
        }
    }

    #[test]
    fn test_thumbnail_path_for_image_keeps_name() {
        let path = thumbnail_path(Path::new("thumbnails"), "2024/beach.webp");
        assert_eq!(path, PathBuf::from("thumbnails/2024/beach.webp"));
    }

    #[test]
    fn test_thumbnail_path_for_video_uses_jpg() {
        let path = thumbnail_path(Path::new("thumbnails"), "party.final.MOV");
        assert_eq!(path, PathBuf::from("thumbnails/party.final.jpg"));
    }

    #[test]
    fn test_label_falls_back_to_filename() {
        let item = MediaItem::new("a.jpg", None, date());
        assert_eq!(item.label(), "a.jpg");
        assert_eq!(item.description_text(), "");

        let item = MediaItem::new("a.jpg", Some(String::new()), date());
        assert_eq!(item.label(), "a.jpg");

        let item = MediaItem::new("a.jpg", Some("Our first trip".into()), date());
        assert_eq!(item.label(), "Our first trip");
        assert_eq!(item.description_text(), "Our first trip");
    }

    #[test]
    fn test_kind() {
        assert_eq!(MediaItem::new("a.webm", None, date()).kind(), MediaKind::Video);
        assert_eq!(MediaItem::new("a.gif", None, date()).kind(), MediaKind::Image);
    }
}
