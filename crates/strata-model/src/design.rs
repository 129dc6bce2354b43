use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layer::{Layer, LayerRef};

/// The canvas plus its ordered set of layers, the root record the
/// compositor consumes.
///
/// The list order is *not* the render order: rendering derives its order
/// from each layer's `z_index`, with list position only breaking ties.
/// Layers live inside the design record, so dropping a design drops its
/// layers with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    /// Unique design identifier.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Canvas width in pixels; always positive.
    pub width: u32,
    /// Canvas height in pixels; always positive.
    pub height: u32,
    /// Optional thumbnail locator, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Layers in insertion order.
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Design {
    /// Create an empty design with the given canvas size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: None,
            width,
            height,
            thumbnail: None,
            layers: Vec::new(),
        }
    }

    /// Append a layer, preserving insertion order for z-index ties.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Get a layer by id.
    pub fn get_layer(&self, id: &LayerRef) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    /// Get a mutable reference to a layer by id.
    pub fn get_layer_mut(&mut self, id: &LayerRef) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| &l.id == id)
    }

    /// Remove a layer by id. Returns the removed layer, if any.
    pub fn remove_layer(&mut self, id: &LayerRef) -> Option<Layer> {
        let idx = self.layers.iter().position(|l| &l.id == id)?;
        Some(self.layers.remove(idx))
    }

    /// The structural base layer, if one is present.
    pub fn base_layer(&self) -> Option<&Layer> {
        self.layers.iter().find(|l| l.is_base())
    }

    /// Layers in render order: ascending `z_index`, ties keeping their
    /// insertion order (stable sort).
    pub fn render_order(&self) -> Vec<&Layer> {
        let mut ordered: Vec<&Layer> = self.layers.iter().collect();
        ordered.sort_by_key(|l| l.z_index);
        ordered
    }
}
