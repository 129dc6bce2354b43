//! Boundary validation: loosely-typed request payloads in, well-typed
//! records out. The transform pipeline and compositor never see
//! partially-typed input; every coercion happens exactly once, here.

use serde::{Deserialize, Serialize};

use crate::asset::AssetRef;
use crate::design::Design;
use crate::layer::{CropRect, Layer, LayerRef};
use strata_core::StrataError;

/// A layer payload as it arrives at the system boundary: every field
/// optional, numerics unclamped, plus the legacy `flipped` alias some
/// older clients still send for `flipX`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub asset: Option<AssetRef>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub flip_x: Option<bool>,
    #[serde(default)]
    pub flip_y: Option<bool>,
    /// Legacy alias for `flipX`.
    #[serde(default)]
    pub flipped: Option<bool>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub z_index: Option<i32>,
    #[serde(default)]
    pub crop_x: Option<f64>,
    #[serde(default)]
    pub crop_y: Option<f64>,
    #[serde(default)]
    pub crop_w: Option<f64>,
    #[serde(default)]
    pub crop_h: Option<f64>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub locked: Option<bool>,
}

/// A design payload as it arrives at the system boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDraft {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub layers: Vec<LayerDraft>,
}

/// Validate and coerce a single layer draft into a typed `Layer`.
///
/// Coercions applied:
/// - width/height below 1 pixel are clamped up to 1, never rejected
/// - opacity is clamped into [0, 1], defaulting to 1
/// - a crop rectangle is accepted only when both `cropW` and `cropH`
///   are present (`cropX`/`cropY` default to 0); a partial crop is
///   dropped rather than guessed at
/// - `flipped` is honored as `flipX` when `flipX` itself is absent
///
/// Missing id, width, or height are structural errors, not coercible.
pub fn validate_layer(draft: &LayerDraft) -> Result<Layer, Vec<StrataError>> {
    let mut errors = Vec::new();

    let id = match &draft.id {
        Some(raw) if !raw.is_empty() => LayerRef::from_raw(raw.clone()),
        _ => {
            errors.push(StrataError::Validation("layer is missing an id".into()));
            LayerRef::local("layer-invalid")
        }
    };

    if draft.width.is_none() {
        errors.push(StrataError::Validation(format!(
            "layer '{}' is missing width",
            id
        )));
    }
    if draft.height.is_none() {
        errors.push(StrataError::Validation(format!(
            "layer '{}' is missing height",
            id
        )));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let width = draft.width.unwrap_or(1.0).max(1.0);
    let height = draft.height.unwrap_or(1.0).max(1.0);

    let crop = match (draft.crop_w, draft.crop_h) {
        (Some(w), Some(h)) => Some(CropRect::new(
            draft.crop_x.unwrap_or(0.0),
            draft.crop_y.unwrap_or(0.0),
            w,
            h,
        )),
        _ => None,
    };

    Ok(Layer {
        id,
        name: draft.name.clone(),
        asset: draft.asset.clone(),
        x: draft.x.unwrap_or(0.0),
        y: draft.y.unwrap_or(0.0),
        width,
        height,
        rotation: draft.rotation.unwrap_or(0.0),
        flip_x: draft.flip_x.or(draft.flipped).unwrap_or(false),
        flip_y: draft.flip_y.unwrap_or(false),
        opacity: draft.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
        z_index: draft.z_index.unwrap_or(0),
        crop,
        visible: draft.visible.unwrap_or(true),
        locked: draft.locked.unwrap_or(false),
    })
}

/// Validate a design draft into a typed `Design`.
///
/// Checks canvas dimensions, validates every layer, rejects duplicate
/// layer ids, and enforces the at-most-one-base-layer convention.
/// All errors are collected rather than failing on the first.
pub fn validate_design(draft: &DesignDraft) -> Result<Design, Vec<StrataError>> {
    let mut errors = Vec::new();

    let width = draft.width.unwrap_or(0);
    let height = draft.height.unwrap_or(0);
    if width == 0 || height == 0 {
        errors.push(StrataError::Validation(
            "design canvas dimensions must be non-zero".into(),
        ));
    }

    let mut layers = Vec::with_capacity(draft.layers.len());
    for layer_draft in &draft.layers {
        match validate_layer(layer_draft) {
            Ok(layer) => layers.push(layer),
            Err(mut layer_errors) => errors.append(&mut layer_errors),
        }
    }

    let mut seen = std::collections::HashSet::new();
    for layer in &layers {
        if !seen.insert(layer.id.clone()) {
            errors.push(StrataError::Validation(format!(
                "duplicate layer id: {}",
                layer.id
            )));
        }
    }

    if layers.iter().filter(|l| l.is_base()).count() > 1 {
        errors.push(StrataError::Validation(
            "design has more than one base layer".into(),
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Design {
        id: draft
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        title: draft.title.clone(),
        width,
        height,
        thumbnail: draft.thumbnail.clone(),
        layers,
    })
}
