use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use strata_core::{Canvas, StrataError, StrataResult};

/// PNG encoder for composited canvases, using the `png` crate.
/// RGBA8 with the alpha channel written through untouched, so designs
/// with transparent regions export transparent.
pub struct PngExporter;

impl PngExporter {
    /// Encode a canvas to an in-memory PNG byte buffer.
    pub fn encode(canvas: &Canvas) -> StrataResult<Vec<u8>> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(StrataError::Encode("cannot encode an empty canvas".into()));
        }

        let mut bytes = Vec::new();
        Self::write(canvas, &mut bytes)?;

        tracing::debug!(
            "encoded {}x{} canvas to PNG ({} bytes)",
            canvas.width,
            canvas.height,
            bytes.len()
        );

        Ok(bytes)
    }

    /// Encode a canvas straight to a file, creating parent directories
    /// as needed.
    pub fn encode_to_path(canvas: &Canvas, output_path: &Path) -> StrataResult<()> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(StrataError::Encode("cannot encode an empty canvas".into()));
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(output_path)
            .map_err(|e| StrataError::Encode(format!("failed to create PNG file: {}", e)))?;
        Self::write(canvas, BufWriter::new(file))?;

        tracing::info!(
            "encoded {}x{} canvas to {}",
            canvas.width,
            canvas.height,
            output_path.display()
        );

        Ok(())
    }

    fn write<W: std::io::Write>(canvas: &Canvas, out: W) -> StrataResult<()> {
        let mut encoder = png::Encoder::new(out, canvas.width, canvas.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| StrataError::Encode(format!("failed to write PNG header: {}", e)))?;
        writer
            .write_image_data(&canvas.data)
            .map_err(|e| StrataError::Encode(format!("failed to write PNG data: {}", e)))?;
        writer
            .finish()
            .map_err(|e| StrataError::Encode(format!("failed to finalize PNG: {}", e)))?;

        Ok(())
    }
}
