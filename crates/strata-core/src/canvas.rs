use serde::{Deserialize, Serialize};

/// A raster surface as a raw RGBA8 pixel buffer (4 bytes per pixel).
///
/// Every intermediate buffer in the compositing pipeline is a `Canvas`:
/// decoded source images, transformed layer buffers, and the final
/// composite all share this representation, which keeps the blend math
/// deterministic across stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    /// Raw RGBA pixel data, row-major.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a new canvas filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * 4;
        Self {
            data: vec![0u8; size],
            width,
            height,
        }
    }

    /// Create a canvas filled with a solid RGBA color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&rgba);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Wrap an existing RGBA byte buffer. Returns None if the length
    /// does not match the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Total byte size of the pixel data.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data[offset..offset + 4].copy_from_slice(&rgba);
    }

    /// Alpha-composite `src` on top of `self` at position (dx, dy) using
    /// standard "over" blending, with the source alpha scaled by the
    /// scalar `opacity` in [0, 1].
    ///
    /// The source region falling outside the destination is clipped.
    /// Integer math throughout keeps the result bit-exact across runs.
    pub fn composite_over(&mut self, src: &Canvas, dx: i32, dy: i32, opacity: f64) {
        let op = (opacity.clamp(0.0, 1.0) * 255.0).round() as u32;
        if op == 0 {
            return;
        }

        let dst_width = self.width as i32;
        let dst_height = self.height as i32;

        let mut start_y = 0;
        let mut end_y = src.height as i32;
        let mut start_x = 0;
        let mut end_x = src.width as i32;

        if dy < 0 {
            start_y = -dy;
        }
        if dy + end_y > dst_height {
            end_y = dst_height - dy;
        }
        if dx < 0 {
            start_x = -dx;
        }
        if dx + end_x > dst_width {
            end_x = dst_width - dx;
        }

        if start_x >= end_x || start_y >= end_y {
            return;
        }

        let src_stride = (src.width * 4) as usize;
        let dst_stride = (self.width * 4) as usize;

        for sy in start_y..end_y {
            let dst_y = dy + sy;
            let src_row_start = (sy as usize * src_stride) + (start_x as usize * 4);
            let dst_row_start = (dst_y as usize * dst_stride) + ((dx + start_x) as usize * 4);
            let len = (end_x - start_x) as usize * 4;

            let src_slice = &src.data[src_row_start..src_row_start + len];
            let dst_slice = &mut self.data[dst_row_start..dst_row_start + len];

            // 4 bytes per pixel loop (auto-vectorizes well)
            for (s, d) in src_slice.chunks_exact(4).zip(dst_slice.chunks_exact_mut(4)) {
                let sa = (s[3] as u32 * op) / 255;
                if sa == 0 {
                    continue;
                }
                if sa == 255 {
                    d.copy_from_slice(s);
                    continue;
                }

                let da = d[3] as u32;
                let inv_sa = 255 - sa;
                let out_a = sa + ((da * inv_sa) / 255);

                if out_a == 0 {
                    continue;
                }

                let s_r = s[0] as u32;
                let s_g = s[1] as u32;
                let s_b = s[2] as u32;
                let d_r = d[0] as u32;
                let d_g = d[1] as u32;
                let d_b = d[2] as u32;

                let out_r = (s_r * sa * 255 + d_r * da * inv_sa) / (out_a * 255);
                let out_g = (s_g * sa * 255 + d_g * da * inv_sa) / (out_a * 255);
                let out_b = (s_b * sa * 255 + d_b * da * inv_sa) / (out_a * 255);

                d[0] = out_r as u8;
                d[1] = out_g as u8;
                d[2] = out_b as u8;
                d[3] = out_a as u8;
            }
        }
    }
}
