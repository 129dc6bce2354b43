//! The per-layer transform pipeline.
//!
//! Applies the canonical, non-commutative operation order to a decoded
//! source image: crop, then resize, then flip, then rotate. Crop comes
//! first because the crop rectangle is defined in source pixel
//! coordinates and must be extracted before any coordinate-space
//! change; the rest of the order follows from that anchor.

use image::imageops::{self, FilterType};

use strata_core::{Canvas, Rect, StrataError, StrataResult};
use strata_model::{CropRect, Layer};

use crate::decode::{from_rgba_image, to_rgba_image};

/// A layer rendered to its own buffer, positioned for compositing.
///
/// `origin_x`/`origin_y` already account for the bounding-box expansion
/// a rotation introduces, so the pre-rotation center stays anchored at
/// the layer's declared center.
#[derive(Debug, Clone)]
pub struct RenderedLayer {
    /// The transformed RGBA buffer.
    pub pixels: Canvas,
    pub origin_x: i32,
    pub origin_y: i32,
    /// Scalar opacity applied at composite time.
    pub opacity: f64,
    /// Render-order key, carried through for the compositor's sort.
    pub z_index: i32,
    pub visible: bool,
}

/// Run one layer's source image through the transform pipeline.
///
/// Fails with `InvalidGeometry` when the crop rectangle has no area
/// left after clamping to the source bounds; callers treat that as a
/// skip, not a fatal error.
pub fn render_layer(source: &Canvas, layer: &Layer) -> StrataResult<RenderedLayer> {
    // 1. Crop, in source pixel space, clamped to the source bounds.
    let cropped = match &layer.crop {
        Some(crop) => crop_source(source, crop)?,
        None => source.clone(),
    };

    // 2. Resize to exactly the declared canvas-space size. Aspect ratio
    //    is not preserved; non-uniform scaling is expected.
    let target_w = layer.width.round().max(1.0) as u32;
    let target_h = layer.height.round().max(1.0) as u32;
    let mut img = to_rgba_image(&cropped);
    if img.dimensions() != (target_w, target_h) {
        img = imageops::resize(&img, target_w, target_h, FilterType::Triangle);
    }

    // 3. Flip the resized buffer. Applying either flip twice is the
    //    identity, which the mirror operations guarantee per pixel.
    if layer.flip_x {
        img = imageops::flip_horizontal(&img);
    }
    if layer.flip_y {
        img = imageops::flip_vertical(&img);
    }

    // 4. Rotate about the buffer center, expanding the bounding box and
    //    filling exposed area with transparent pixels.
    let pixels = rotate_canvas(&from_rgba_image(img), layer.rotation);

    // Anchor the pre-rotation center at the declared layer center.
    let origin_x = (layer.x + layer.width / 2.0 - pixels.width as f64 / 2.0).round() as i32;
    let origin_y = (layer.y + layer.height / 2.0 - pixels.height as f64 / 2.0).round() as i32;

    Ok(RenderedLayer {
        pixels,
        origin_x,
        origin_y,
        opacity: layer.opacity,
        z_index: layer.z_index,
        visible: layer.visible,
    })
}

/// Extract the crop rectangle from the source, clamping it to the
/// source bounds. A rectangle with zero effective area after clamping
/// is `InvalidGeometry`.
fn crop_source(source: &Canvas, crop: &CropRect) -> StrataResult<Canvas> {
    let bounds = Rect::new(0.0, 0.0, source.width as f64, source.height as f64);
    let clamped = crop.as_rect().intersect(&bounds);
    if clamped.is_empty() {
        return Err(StrataError::InvalidGeometry(format!(
            "crop ({}, {}, {}, {}) has no area within the {}x{} source",
            crop.x, crop.y, crop.w, crop.h, source.width, source.height
        )));
    }

    let x0 = clamped.x.round() as u32;
    let y0 = clamped.y.round() as u32;
    let w = (clamped.width.round() as u32).min(source.width - x0);
    let h = (clamped.height.round() as u32).min(source.height - y0);
    if w == 0 || h == 0 {
        return Err(StrataError::InvalidGeometry(format!(
            "crop ({}, {}, {}, {}) rounds to an empty rectangle",
            crop.x, crop.y, crop.w, crop.h
        )));
    }

    let mut out = Canvas::new(w, h);
    let src_stride = (source.width * 4) as usize;
    let dst_stride = (w * 4) as usize;
    for row in 0..h {
        let src_start = ((y0 + row) as usize * src_stride) + (x0 as usize * 4);
        let dst_start = row as usize * dst_stride;
        out.data[dst_start..dst_start + dst_stride]
            .copy_from_slice(&source.data[src_start..src_start + dst_stride]);
    }
    Ok(out)
}

/// Rotate a buffer by `degrees` about its own center.
///
/// Any multiple of 360 is the identity, bit for bit. Exact quarter
/// turns use the lossless transposition paths; everything else is an
/// inverse-mapped bilinear resample into the expanded bounding box.
fn rotate_canvas(canvas: &Canvas, degrees: f64) -> Canvas {
    let rot = degrees.rem_euclid(360.0);
    if rot == 0.0 {
        return canvas.clone();
    }
    if rot == 90.0 {
        return from_rgba_image(imageops::rotate90(&to_rgba_image(canvas)));
    }
    if rot == 180.0 {
        return from_rgba_image(imageops::rotate180(&to_rgba_image(canvas)));
    }
    if rot == 270.0 {
        return from_rgba_image(imageops::rotate270(&to_rgba_image(canvas)));
    }

    let theta = rot.to_radians();
    let (sin, cos) = theta.sin_cos();

    let w = canvas.width as f64;
    let h = canvas.height as f64;
    let out_w = ((w * cos.abs() + h * sin.abs()).ceil() as u32).max(1);
    let out_h = ((w * sin.abs() + h * cos.abs()).ceil() as u32).max(1);

    let ocx = out_w as f64 / 2.0;
    let ocy = out_h as f64 / 2.0;
    let scx = w / 2.0;
    let scy = h / 2.0;

    let mut out = Canvas::new(out_w, out_h);
    for dy in 0..out_h {
        for dx in 0..out_w {
            // Inverse-map the destination pixel center into source space.
            let rx = dx as f64 + 0.5 - ocx;
            let ry = dy as f64 + 0.5 - ocy;
            let sx = rx * cos + ry * sin + scx - 0.5;
            let sy = -rx * sin + ry * cos + scy - 0.5;
            let pixel = sample_bilinear(canvas, sx, sy);
            if pixel[3] != 0 {
                out.set_pixel(dx, dy, pixel);
            }
        }
    }
    out
}

/// Bilinear sample at a fractional source coordinate; coordinates
/// outside the buffer contribute fully transparent pixels.
fn sample_bilinear(canvas: &Canvas, x: f64, y: f64) -> [u8; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let fetch = |px: f64, py: f64| -> [f64; 4] {
        if px < 0.0 || py < 0.0 {
            return [0.0; 4];
        }
        match canvas.get_pixel(px as u32, py as u32) {
            Some([r, g, b, a]) => [r as f64, g as f64, b as f64, a as f64],
            None => [0.0; 4],
        }
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1.0, y0);
    let p01 = fetch(x0, y0 + 1.0);
    let p11 = fetch(x0 + 1.0, y0 + 1.0);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}
