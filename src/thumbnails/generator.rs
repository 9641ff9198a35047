//! Thumbnail generation using the image crate.
//!
//! Walks the media directory and writes a downscaled copy of every image
//! into the thumbnail directory under the same relative name. Videos get a
//! still frame saved as `<stem>.jpg` when `ffmpeg` is available.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::image_loader;
use crate::models::{is_video, thumbnail_path};

/// Default bounding box for thumbnails in pixels.
pub const DEFAULT_MAX_SIZE: u32 = 960;

/// JPEG quality for thumbnail encoding (0-100).
const JPEG_QUALITY: u8 = 85;

/// Counts from one generation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateSummary {
    pub generated: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Thumbnail generator that writes resized copies of the media directory.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailGenerator {
    max_size: u32,
    force: bool,
}

impl Default for ThumbnailGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl ThumbnailGenerator {
    pub fn new(max_size: u32) -> Self {
        Self {
            max_size: max_size.max(1),
            force: false,
        }
    }

    /// Regenerate thumbnails even when they are newer than their source.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Generate thumbnails for everything under `media_root`.
    ///
    /// Individual failures are logged and counted; only an unreadable
    /// `media_root` is an error.
    pub fn run(&self, media_root: &Path, thumb_root: &Path) -> Result<GenerateSummary> {
        if !media_root.is_dir() {
            anyhow::bail!("Media directory not found: {:?}", media_root);
        }

        let mut summary = GenerateSummary::default();

        for entry in WalkDir::new(media_root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable entry");
                    summary.failed += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let src = entry.path();
            let Some(filename) = relative_name(media_root, src) else {
                continue;
            };
            let dst = thumbnail_path(thumb_root, &filename);

            if !self.force && is_up_to_date(src, &dst) {
                summary.up_to_date += 1;
                continue;
            }

            let img = if is_video(&filename) {
                match image_loader::extract_video_frame(src) {
                    Some(frame) => frame,
                    None => {
                        info!(file = %filename, "Skipping video, no frame could be extracted");
                        summary.skipped += 1;
                        continue;
                    }
                }
            } else if format_from_extension(src).is_some() {
                match image_loader::open_image(src) {
                    Ok(img) => img,
                    Err(err) => {
                        warn!(file = %filename, error = %err, "Failed to load image");
                        summary.failed += 1;
                        continue;
                    }
                }
            } else {
                debug!(file = %filename, "Not an image, skipping");
                summary.skipped += 1;
                continue;
            };

            match self.write_thumbnail(&img, &dst) {
                Ok((width, height)) => {
                    debug!(file = %filename, width, height, "Generated thumbnail");
                    summary.generated += 1;
                }
                Err(err) => {
                    warn!(file = %filename, error = %err, "Failed to write thumbnail");
                    summary.failed += 1;
                }
            }
        }

        info!(
            generated = summary.generated,
            up_to_date = summary.up_to_date,
            skipped = summary.skipped,
            failed = summary.failed,
            "Thumbnail generation finished"
        );

        Ok(summary)
    }

    fn write_thumbnail(&self, img: &DynamicImage, dst: &Path) -> Result<(u32, u32)> {
        let (src_width, src_height) = img.dimensions();
        let (width, height) = calculate_dimensions(src_width, src_height, self.max_size);

        let thumbnail = if (width, height) == (src_width, src_height) {
            img.clone()
        } else {
            img.resize_exact(width, height, FilterType::CatmullRom)
        };

        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create thumbnail directory: {:?}", parent))?;
        }

        save_thumbnail(&thumbnail, dst)?;
        Ok((width, height))
    }
}

/// `path` relative to `root`, with `/` separators.
fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn is_up_to_date(src: &Path, dst: &Path) -> bool {
    match (modified(src), modified(dst)) {
        (Some(src_time), Some(dst_time)) => dst_time >= src_time,
        _ => false,
    }
}

/// Determine image format from file extension.
fn format_from_extension(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "webp" => Some(ImageFormat::WebP),
        "gif" => Some(ImageFormat::Gif),
        "bmp" => Some(ImageFormat::Bmp),
        "tiff" | "tif" => Some(ImageFormat::Tiff),
        _ => None,
    }
}

/// Fit `src` inside a `max_size` square, never upscaling.
fn calculate_dimensions(src_width: u32, src_height: u32, max_size: u32) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (max_size, max_size);
    }
    if src_width <= max_size && src_height <= max_size {
        return (src_width, src_height);
    }

    let scale = (max_size as f64 / src_width as f64).min(max_size as f64 / src_height as f64);
    let width = (src_width as f64 * scale).round() as u32;
    let height = (src_height as f64 * scale).round() as u32;

    (width.clamp(1, max_size), height.clamp(1, max_size))
}

/// Save in the format the thumbnail's extension names. JPEG gets a fixed quality.
fn save_thumbnail(img: &DynamicImage, dst: &Path) -> Result<()> {
    let format = format_from_extension(dst).unwrap_or(ImageFormat::Jpeg);

    if format == ImageFormat::Jpeg {
        let file = File::create(dst)
            .with_context(|| format!("Failed to create thumbnail file: {:?}", dst))?;
        let mut writer = BufWriter::new(file);

        // No alpha channel in JPEG
        let rgb_img = img.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .with_context(|| format!("Failed to encode thumbnail: {:?}", dst))?;
    } else {
        img.save_with_format(dst, format)
            .with_context(|| format!("Failed to encode thumbnail: {:?}", dst))?;
    }

    debug!(?dst, "Saved thumbnail");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn write_png(path: &Path, width: u32, height: u32) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        ImageBuffer::from_pixel(width, height, Rgb([200u8, 100, 50]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_calculate_dimensions_landscape() {
        assert_eq!(calculate_dimensions(1920, 1080, 960), (960, 540));
    }

    #[test]
    fn test_calculate_dimensions_portrait() {
        assert_eq!(calculate_dimensions(1000, 4000, 960), (240, 960));
    }

    #[test]
    fn test_calculate_dimensions_small_source() {
        // Source smaller than the box - don't upscale
        assert_eq!(calculate_dimensions(200, 100, 960), (200, 100));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            format_from_extension(Path::new("test.jpg")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            format_from_extension(Path::new("test.PNG")),
            Some(ImageFormat::Png)
        );
        assert_eq!(format_from_extension(Path::new("test.txt")), None);
    }

    #[test]
    fn test_relative_name_uses_forward_slashes() {
        let root = Path::new("/g/media");
        assert_eq!(
            relative_name(root, &root.join("2024").join("a.png")).as_deref(),
            Some("2024/a.png")
        );
        assert_eq!(relative_name(root, Path::new("/elsewhere/a.png")), None);
    }

    #[test]
    fn test_run_mirrors_media_tree() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        let thumbs = dir.path().join("thumbnails");
        write_png(&media.join("big.png"), 2000, 1000);
        write_png(&media.join("nested/small.png"), 100, 50);
        std::fs::write(media.join("notes.txt"), b"hello").unwrap();

        let summary = ThumbnailGenerator::default().run(&media, &thumbs).unwrap();
        assert_eq!(summary.generated, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);

        let big = image::open(thumbs.join("big.png")).unwrap();
        assert_eq!(big.dimensions(), (960, 480));
        let small = image::open(thumbs.join("nested/small.png")).unwrap();
        assert_eq!(small.dimensions(), (100, 50));
    }

    #[test]
    fn test_run_skips_fresh_thumbnails_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        let thumbs = dir.path().join("thumbnails");
        write_png(&media.join("a.png"), 50, 50);

        let generator = ThumbnailGenerator::new(32);
        assert_eq!(generator.run(&media, &thumbs).unwrap().generated, 1);

        let again = generator.run(&media, &thumbs).unwrap();
        assert_eq!(again.generated, 0);
        assert_eq!(again.up_to_date, 1);

        let forced = generator.force(true).run(&media, &thumbs).unwrap();
        assert_eq!(forced.generated, 1);
    }

    #[test]
    fn test_run_counts_broken_images() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        std::fs::create_dir_all(&media).unwrap();
        std::fs::write(media.join("broken.jpg"), b"not an image").unwrap();

        let summary = ThumbnailGenerator::default()
            .run(&media, &dir.path().join("thumbnails"))
            .unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.generated, 0);
    }

    #[test]
    fn test_run_requires_media_dir() {
        let dir = tempfile::tempdir().unwrap();
        let result = ThumbnailGenerator::default().run(&dir.path().join("missing"), dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("photo.png");
        write_png(&src, 1200, 600);

        let dst = dir.path().join("out/photo.jpg");
        let img = image_loader::open_image(&src).unwrap();
        let dims = ThumbnailGenerator::new(300).write_thumbnail(&img, &dst).unwrap();
        assert_eq!(dims, (300, 150));
        assert_eq!(image::open(&dst).unwrap().dimensions(), (300, 150));
    }
}
