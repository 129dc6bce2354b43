//! # strata-encode
//!
//! Export encoding. Converts a composited RGBA canvas to PNG, the one
//! format the export surface serves. Lossless, alpha preserved.

pub mod png_export;

pub use png_export::PngExporter;

/// Suggested download filename for an exported design.
pub fn export_filename(design_id: &str) -> String {
    format!("design-{}.png", design_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("abc123"), "design-abc123.png");
    }
}
