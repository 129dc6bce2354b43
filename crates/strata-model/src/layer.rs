use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::asset::AssetRef;
use strata_core::Rect;

/// A layer identifier, tagged by persistence state.
///
/// Layers created client-side get a synthetic local id (the editor uses
/// `base-image` and `layer-<n>` style ids) until the persistence boundary
/// issues a real one. Operations that talk to that boundary must check
/// `is_persisted()` and no-op or queue on local ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerRef {
    /// Synthetic client-side id; not known to any persistence boundary.
    Local(String),
    /// Server-issued id.
    Persisted(String),
}

impl LayerRef {
    pub fn local(id: impl Into<String>) -> Self {
        LayerRef::Local(id.into())
    }

    pub fn persisted(id: impl Into<String>) -> Self {
        LayerRef::Persisted(id.into())
    }

    /// Mint a fresh persisted id.
    pub fn new_persisted() -> Self {
        LayerRef::Persisted(Uuid::new_v4().to_string())
    }

    /// Classify a raw id string. The editor's synthetic ids use the
    /// `base-image` / `layer-` naming; everything else is a stored id.
    pub fn from_raw(id: impl Into<String>) -> Self {
        let id = id.into();
        if id == "base-image" || id.starts_with("layer-") {
            LayerRef::Local(id)
        } else {
            LayerRef::Persisted(id)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LayerRef::Local(id) | LayerRef::Persisted(id) => id,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, LayerRef::Local(_))
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, LayerRef::Persisted(_))
    }
}

impl std::fmt::Display for LayerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// On the wire a layer id is a plain string; the Local/Persisted tag is
// recovered from the synthetic-id naming when deserializing.
impl Serialize for LayerRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LayerRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LayerRef::from_raw(raw))
    }
}

/// A crop rectangle in *source image* pixel space, extracted before any
/// resize. All four fields travel together; the wire format keeps the
/// original flat `cropX`/`cropY`/`cropW`/`cropH` naming.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    #[serde(rename = "cropX")]
    pub x: f64,
    #[serde(rename = "cropY")]
    pub y: f64,
    #[serde(rename = "cropW")]
    pub w: f64,
    #[serde(rename = "cropH")]
    pub h: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// One positioned, transformed image element within a design.
///
/// Geometry is in canvas pixel space. `z_index` determines render order
/// (ties broken by stable list order); `locked` affects only interactive
/// editing, never rendering. The asset reference is immutable once set;
/// changing the image means creating a new layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Layer identifier (local or persisted).
    pub id: LayerRef,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Source image reference. Absent only in transient local states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetRef>,
    /// Top-left position on the canvas.
    pub x: f64,
    pub y: f64,
    /// Target size on the canvas; always positive.
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees, any real value, interpreted mod 360.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    /// Opacity in [0, 1].
    pub opacity: f64,
    /// Render-order key; higher paints later (on top).
    #[serde(default)]
    pub z_index: i32,
    /// Optional crop rectangle in source pixel space.
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
}

impl Layer {
    /// Create a new layer with default transform attributes.
    pub fn new(id: LayerRef, asset: Option<AssetRef>, width: f64, height: f64) -> Self {
        Self {
            id,
            name: None,
            asset,
            x: 0.0,
            y: 0.0,
            width,
            height,
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
            opacity: 1.0,
            z_index: 0,
            crop: None,
            visible: true,
            locked: false,
        }
    }

    /// Builder: set position.
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Builder: set opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Builder: set the render-order key.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Builder: set rotation in degrees.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder: set the crop rectangle.
    pub fn with_crop(mut self, crop: CropRect) -> Self {
        self.crop = Some(crop);
        self
    }

    /// The layer's axis-aligned bounds on the canvas (pre-rotation).
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// The layer's declared center, the anchor that rotation and
    /// snapping both work from.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether this is the structural base layer (the z-index 0
    /// background convention; the editor names it `base-image`).
    pub fn is_base(&self) -> bool {
        self.id.as_str() == "base-image"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_ref_classification() {
        assert!(LayerRef::from_raw("base-image").is_local());
        assert!(LayerRef::from_raw("layer-3").is_local());
        assert!(LayerRef::from_raw("ckx81h2aa0001").is_persisted());
        assert!(LayerRef::new_persisted().is_persisted());
    }

    #[test]
    fn test_layer_ref_roundtrips_as_string() {
        let json = serde_json::to_string(&LayerRef::local("layer-1")).unwrap();
        assert_eq!(json, "\"layer-1\"");
        let back: LayerRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LayerRef::local("layer-1"));
    }

    #[test]
    fn test_layer_creation_defaults() {
        let layer = Layer::new(LayerRef::persisted("l1"), None, 200.0, 100.0);
        assert!(layer.visible);
        assert!(!layer.locked);
        assert_eq!(layer.opacity, 1.0);
        assert_eq!(layer.z_index, 0);
        assert!(layer.crop.is_none());
    }

    #[test]
    fn test_layer_center() {
        let layer = Layer::new(LayerRef::persisted("l1"), None, 100.0, 50.0).with_position(10.0, 20.0);
        assert_eq!(layer.center(), (60.0, 45.0));
    }

    #[test]
    fn test_layer_wire_format_flat_crop() {
        let layer = Layer::new(LayerRef::persisted("l1"), None, 10.0, 10.0)
            .with_crop(CropRect::new(1.0, 2.0, 3.0, 4.0));
        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["cropX"], 1.0);
        assert_eq!(value["cropW"], 3.0);
        assert_eq!(value["zIndex"], 0);
        assert_eq!(value["flipX"], false);

        let back: Layer = serde_json::from_value(value).unwrap();
        assert_eq!(back.crop, Some(CropRect::new(1.0, 2.0, 3.0, 4.0)));
    }

    #[test]
    fn test_base_layer_convention() {
        let base = Layer::new(LayerRef::local("base-image"), None, 800.0, 600.0);
        assert!(base.is_base());
        let other = Layer::new(LayerRef::local("layer-1"), None, 10.0, 10.0);
        assert!(!other.is_base());
    }
}
