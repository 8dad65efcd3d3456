//! Page image helpers: cropping regions and PNG encoding.

use crate::error::Result;
use crate::geometry::Rect;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// Crop the part of `page` covered by `bbox`.
///
/// The box is clamped to the image. Returns `None` for malformed boxes or
/// boxes that fall entirely outside the page.
pub fn crop_region(page: &DynamicImage, bbox: &Rect) -> Option<DynamicImage> {
    let (x, y, width, height) = bbox.pixel_window(page.width(), page.height())?;
    Some(page.crop_imm(x, y, width, height))
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Write an image as PNG, creating parent directories as needed.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<Vec<u8>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = encode_png(image)?;
    std::fs::write(path, &bytes)?;
    Ok(bytes)
}
