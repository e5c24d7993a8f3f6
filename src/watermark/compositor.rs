//! Overlay rendering
//!
//! Decodes photo and watermark, scales the watermark to the placement computed by
//! [`compute`], pads it with transparent pixels so it never distorts, alpha-blends it
//! onto the photo and re-encodes the result as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageError, RgbaImage};
use thiserror::Error;

use super::position::{compute, Placement};
use super::Anchor;
use crate::core::config;

#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("failed to decode {which}: {source}")]
    Decode {
        which: &'static str,
        #[source]
        source: ImageError,
    },

    #[error("{which} has zero width or height")]
    InvalidDimensions { which: &'static str },

    #[error("failed to encode result: {0}")]
    Encode(#[source] ImageError),

    #[error("render worker aborted: {0}")]
    Aborted(String),
}

/// Renders `watermark` onto `photo` at `anchor` and returns JPEG bytes.
///
/// CPU-bound; async callers should go through [`render_blocking`].
pub fn render(photo: &[u8], watermark: &[u8], anchor: Anchor) -> Result<Vec<u8>, WatermarkError> {
    let photo = decode(photo, "photo")?;
    let mark = decode(watermark, "watermark")?;

    let (photo_w, photo_h) = photo.dimensions();
    let (mark_w, mark_h) = mark.dimensions();
    let placement = compute(photo_w, photo_h, mark_w, mark_h, anchor);
    log::debug!(
        "Placing {}x{} watermark on {}x{} photo at {:?} ({})",
        mark_w,
        mark_h,
        photo_w,
        photo_h,
        placement,
        anchor
    );

    let overlay = visible_overlay(&mark, placement, photo_h);
    let mut canvas = photo.to_rgba8();
    imageops::overlay(&mut canvas, &overlay, i64::from(placement.x), i64::from(placement.y));

    encode_jpeg(canvas)
}

/// Runs [`render`] on the blocking thread pool.
pub async fn render_blocking(photo: Vec<u8>, watermark: Vec<u8>, anchor: Anchor) -> Result<Vec<u8>, WatermarkError> {
    tokio::task::spawn_blocking(move || render(&photo, &watermark, anchor))
        .await
        .map_err(|e| WatermarkError::Aborted(e.to_string()))?
}

fn decode(bytes: &[u8], which: &'static str) -> Result<DynamicImage, WatermarkError> {
    let image = image::load_from_memory(bytes).map_err(|source| WatermarkError::Decode { which, source })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(WatermarkError::InvalidDimensions { which });
    }
    Ok(image)
}

/// Materializes only the part of the overlay that lands on the photo.
///
/// A watermark taller than the photo is pinned to the top and clipped at the bottom,
/// so the band is cut from the matching source rows instead of scaling the whole mark.
fn visible_overlay(mark: &DynamicImage, placement: Placement, photo_h: u32) -> RgbaImage {
    let visible_h = placement.h.min(photo_h.saturating_sub(placement.y));
    if visible_h == placement.h {
        return fit_inside(mark, placement.w, placement.h);
    }
    if placement.w == 0 || visible_h == 0 {
        return RgbaImage::new(placement.w, visible_h);
    }

    let (mark_w, mark_h) = mark.dimensions();
    let rows = (f64::from(visible_h) / f64::from(placement.h) * f64::from(mark_h)).ceil() as u32;
    let band = imageops::crop_imm(mark, 0, 0, mark_w, rows.clamp(1, mark_h)).to_image();
    imageops::resize(&band, placement.w, visible_h, FilterType::Lanczos3)
}

/// Scales `mark` to fit inside `width`x`height` keeping its aspect ratio and centers
/// it on a fully transparent canvas of exactly that size.
fn fit_inside(mark: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }

    let (mark_w, mark_h) = mark.dimensions();
    let scale = (f64::from(width) / f64::from(mark_w)).min(f64::from(height) / f64::from(mark_h));
    let scaled_w = ((f64::from(mark_w) * scale).round() as u32).clamp(1, width);
    let scaled_h = ((f64::from(mark_h) * scale).round() as u32).clamp(1, height);

    let resized = imageops::resize(&mark.to_rgba8(), scaled_w, scaled_h, FilterType::Lanczos3);
    if scaled_w == width && scaled_h == height {
        return resized;
    }

    let mut padded = RgbaImage::new(width, height);
    let offset_x = (width - scaled_w) / 2;
    let offset_y = (height - scaled_h) / 2;
    imageops::replace(&mut padded, &resized, i64::from(offset_x), i64::from(offset_y));
    padded
}

fn encode_jpeg(canvas: RgbaImage) -> Result<Vec<u8>, WatermarkError> {
    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, config::render::JPEG_QUALITY);
    rgb.write_with_encoder(encoder).map_err(WatermarkError::Encode)?;
    Ok(out)
}
