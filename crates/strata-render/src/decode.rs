//! Image decoding.
//! Decodes PNG, JPEG, WebP, and other formats into canvases, and
//! bridges between `Canvas` and the `image` crate's buffer type for
//! the resampling operations.

use image::RgbaImage;

use strata_core::{Canvas, StrataError, StrataResult};

/// Decode raw image bytes into an RGBA canvas. The decoded dimensions
/// are authoritative, whatever the asset record claims.
pub fn decode_image(data: &[u8]) -> StrataResult<Canvas> {
    let img = image::load_from_memory(data)
        .map_err(|e| StrataError::Decode(format!("failed to decode image: {}", e)))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut canvas = Canvas::new(width, height);
    canvas.data = rgba.into_raw();

    Ok(canvas)
}

/// View a canvas as an `image` crate buffer for resampling operations.
pub fn to_rgba_image(canvas: &Canvas) -> RgbaImage {
    RgbaImage::from_raw(canvas.width, canvas.height, canvas.data.clone())
        .unwrap_or_else(|| RgbaImage::new(canvas.width.max(1), canvas.height.max(1)))
}

/// Convert an `image` crate buffer back into a canvas.
pub fn from_rgba_image(img: RgbaImage) -> Canvas {
    let (width, height) = img.dimensions();
    let mut canvas = Canvas::new(width, height);
    canvas.data = img.into_raw();
    canvas
}
