use serde::{Deserialize, Serialize};

/// A resolvable reference to a source image.
///
/// The cached `width`/`height` are advisory only; authoritative source
/// dimensions come from decoding the bytes, not from these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    /// Opaque asset identifier.
    pub id: String,
    /// Resolvable locator (path or URL).
    pub url: String,
    /// Original upload filename, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Declared mime type.
    pub mime_type: String,
    /// Cached intrinsic width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Cached intrinsic height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl AssetRef {
    pub fn new(id: impl Into<String>, url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            original_name: None,
            mime_type: mime_type.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Whether the declared mime type is a supported raster image.
    pub fn is_image(&self) -> bool {
        matches!(
            self.mime_type.as_str(),
            "image/jpeg" | "image/png" | "image/webp" | "image/gif"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_ref_mime_types() {
        let png = AssetRef::new("a1", "/uploads/a1.png", "image/png");
        assert!(png.is_image());
        let svg = AssetRef::new("a2", "/uploads/a2.svg", "image/svg+xml");
        assert!(!svg.is_image());
        let pdf = AssetRef::new("a3", "/uploads/a3.pdf", "application/pdf");
        assert!(!pdf.is_image());
    }

    #[test]
    fn test_asset_ref_wire_format() {
        let json = serde_json::json!({
            "id": "a1",
            "url": "/uploads/171-ab12.png",
            "originalName": "hero.png",
            "mimeType": "image/png",
            "width": 800,
            "height": 600
        });
        let asset: AssetRef = serde_json::from_value(json).unwrap();
        assert_eq!(asset.original_name.as_deref(), Some("hero.png"));
        assert_eq!(asset.width, Some(800));
    }
}
