//! Image loading and normalization
//!
//! Single entry point for decoding raster images and normalizing them to the
//! canonical resolution the rest of the pipeline assumes.
//!
//! ## Guarantees
//!
//! Every image returned by [`load_normalized`] has:
//! - width [`CANONICAL_WIDTH`](crate::constants::image::CANONICAL_WIDTH) and
//!   height [`CANONICAL_HEIGHT`](crate::constants::image::CANONICAL_HEIGHT)
//! - RGB channel order, 8-bit per channel

use crate::constants::image::{CANONICAL_HEIGHT, CANONICAL_WIDTH};
use crate::error::{PipelineError, Result};
use image::imageops::{self, FilterType};
use image::{ImageReader, RgbImage};
use std::path::Path;

/// Load an image from disk and decode it to RGB8
///
/// # Errors
///
/// Returns `PipelineError::DecodeError` if:
/// - File cannot be opened
/// - Format is not supported
/// - Decoding fails
pub fn load_image(path: &Path) -> Result<RgbImage> {
    let reader = ImageReader::open(path).map_err(|e| {
        PipelineError::decode(format!("Failed to open image file: {}", path.display()), e)
    })?;

    let img = reader.decode().map_err(|e| {
        PipelineError::decode(format!("Failed to decode image: {}", path.display()), e)
    })?;

    Ok(img.to_rgb8())
}

/// Resize a decoded image to the canonical resolution
///
/// Uses triangle (bilinear) filtering. Images already at the canonical
/// size are returned unchanged.
pub fn normalize(image: RgbImage) -> RgbImage {
    if image.width() == CANONICAL_WIDTH && image.height() == CANONICAL_HEIGHT {
        return image;
    }
    imageops::resize(&image, CANONICAL_WIDTH, CANONICAL_HEIGHT, FilterType::Triangle)
}

/// Load, decode, and normalize an image in one step
///
/// # Errors
///
/// Returns `PipelineError::DecodeError` if the file is missing or not a
/// recognized raster format.
pub fn load_normalized(path: &Path) -> Result<RgbImage> {
    Ok(normalize(load_image(path)?))
}

/// Get list of file extensions accepted during dataset enumeration
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "bmp"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}
