//! # strata-model
//!
//! The canonical record types for a design: canvas dimensions, the
//! ordered layer stack with transform attributes, and asset references. Also home to the boundary validation step that
//! turns loosely-typed layer payloads into well-typed records, and the
//! pure snapping-geometry engine used during interactive placement.

pub mod asset;
pub mod design;
pub mod guides;
pub mod layer;
pub mod validate;

pub use asset::AssetRef;
pub use design::Design;
pub use guides::{compute_guides, snap, snap_position, Guides, DEFAULT_SNAP_TOLERANCE};
pub use layer::{CropRect, Layer, LayerRef};
pub use validate::{validate_design, validate_layer, DesignDraft, LayerDraft};
