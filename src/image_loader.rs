use std::io::Cursor;
use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use image::{DynamicImage, GenericImageView, ImageFormat};

/// Decoded RGBA pixels ready to be wrapped in a texture.
#[derive(Debug)]
pub struct RgbaImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode an image file. Animated GIFs yield their first frame.
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    let format = image::guess_format(&bytes).ok();

    if format == Some(ImageFormat::Gif) {
        let decoder = GifDecoder::new(Cursor::new(bytes))
            .with_context(|| format!("Failed to decode GIF: {:?}", path))?;
        let mut frames = decoder.into_frames();
        if let Some(frame) = frames.next() {
            let frame = frame.context("Failed to decode GIF frame")?;
            return Ok(DynamicImage::ImageRgba8(frame.into_buffer()));
        }
        return Err(anyhow!("GIF has no frames: {:?}", path));
    }

    match format {
        Some(fmt) => image::load_from_memory_with_format(&bytes, fmt)
            .with_context(|| format!("Failed to decode image: {:?}", path)),
        None => image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode image: {:?}", path)),
    }
}

/// Decode `path` and shrink it to fit inside a `max_size` square.
pub fn decode_rgba(path: &Path, max_size: u32) -> Result<RgbaImage> {
    let img = open_image(path)?;
    Ok(to_rgba(img, max_size))
}

pub fn to_rgba(img: DynamicImage, max_size: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let img = if w > max_size || h > max_size {
        img.thumbnail(max_size, max_size)
    } else {
        img
    };
    let (width, height) = img.dimensions();
    RgbaImage {
        pixels: img.to_rgba8().into_raw(),
        width: width.max(1),
        height: height.max(1),
    }
}

/// Grab a still frame from a video with `ffmpeg`, if it is installed.
pub fn extract_video_frame(path: &Path) -> Option<DynamicImage> {
    // Many videos open on a black frame, so try one second in first.
    ffmpeg_extract_frame(path, "00:00:01.000").or_else(|| ffmpeg_extract_frame(path, "00:00:00.000"))
}

fn ffmpeg_extract_frame(path: &Path, timestamp: &str) -> Option<DynamicImage> {
    let output = Command::new("ffmpeg")
        .args(["-v", "error", "-ss", timestamp, "-i"])
        .arg(path)
        .args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
        .output()
        .ok()?;

    if !output.status.success() || output.stdout.is_empty() {
        return None;
    }

    image::load_from_memory(&output.stdout).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn test_decode_rgba_downscales() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        ImageBuffer::from_pixel(400, 100, Rgb([10u8, 20, 30]))
            .save(&path)
            .unwrap();

        let rgba = decode_rgba(&path, 200).unwrap();
        assert_eq!((rgba.width, rgba.height), (200, 50));
        assert_eq!(rgba.pixels.len(), 200 * 50 * 4);
    }

    #[test]
    fn test_decode_rgba_keeps_small_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        ImageBuffer::from_pixel(30, 20, Rgb([0u8, 0, 0])).save(&path).unwrap();

        let rgba = decode_rgba(&path, 200).unwrap();
        assert_eq!((rgba.width, rgba.height), (30, 20));
    }

    #[test]
    fn test_open_image_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(open_image(&path).is_err());
        assert!(open_image(&dir.path().join("missing.jpg")).is_err());
    }
}
