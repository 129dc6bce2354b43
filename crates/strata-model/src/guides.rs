//! Snapping geometry for interactive layer placement.
//!
//! Pure and stateless: guide lines are recomputed from the live layer
//! set on every pointer move, and snapping is a plain function of the
//! candidate position. Linear in sibling count; no I/O.

use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerRef};
use strata_core::Point2D;

/// Default snap distance in canvas pixels.
pub const DEFAULT_SNAP_TOLERANCE: f64 = 6.0;

/// Candidate alignment lines, as x coordinates (vertical lines) and
/// y coordinates (horizontal lines).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guides {
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
}

fn push_unique(lines: &mut Vec<f64>, value: f64) {
    if !lines.iter().any(|&v| v == value) {
        lines.push(value);
    }
}

/// Compute the guide lines for a canvas and its layers.
///
/// The canvas center always comes first on each axis. Every layer other
/// than `excluded` (the one being moved) contributes its leading edge,
/// trailing edge, and center on each axis. Duplicate coordinates are
/// dropped, keeping first-insertion order, so the nearest-first contract
/// of `snap` stays stable as layers move.
pub fn compute_guides(
    canvas_width: f64,
    canvas_height: f64,
    layers: &[Layer],
    excluded: Option<&LayerRef>,
) -> Guides {
    let mut guides = Guides::default();

    push_unique(&mut guides.vertical, canvas_width / 2.0);
    push_unique(&mut guides.horizontal, canvas_height / 2.0);

    for layer in layers {
        if Some(&layer.id) == excluded {
            continue;
        }
        push_unique(&mut guides.vertical, layer.x);
        push_unique(&mut guides.vertical, layer.x + layer.width);
        push_unique(&mut guides.vertical, layer.x + layer.width / 2.0);
        push_unique(&mut guides.horizontal, layer.y);
        push_unique(&mut guides.horizontal, layer.y + layer.height);
        push_unique(&mut guides.horizontal, layer.y + layer.height / 2.0);
    }

    guides
}

/// Snap a candidate coordinate to the first guide line within
/// `tolerance`; if none qualifies the candidate comes back unchanged.
pub fn snap(candidate: f64, lines: &[f64], tolerance: f64) -> f64 {
    for &line in lines {
        if (candidate - line).abs() <= tolerance {
            return line;
        }
    }
    candidate
}

/// Snap a layer's in-progress top-left position.
///
/// Each axis snaps the layer's *center* to the guide lines, then
/// re-derives the top-left corner by subtracting half the width/height.
/// Snapping the corner directly would disagree with center-derived
/// guides whenever sizes differ.
pub fn snap_position(
    layer: &Layer,
    x: f64,
    y: f64,
    guides: &Guides,
    tolerance: f64,
) -> Point2D {
    let center_x = x + layer.width / 2.0;
    let center_y = y + layer.height / 2.0;

    let snapped_x = snap(center_x, &guides.vertical, tolerance) - layer.width / 2.0;
    let snapped_y = snap(center_y, &guides.horizontal, tolerance) - layer.height / 2.0;

    Point2D::new(snapped_x, snapped_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(id: &str, x: f64, y: f64, w: f64, h: f64) -> Layer {
        Layer::new(LayerRef::from_raw(id), None, w, h).with_position(x, y)
    }

    #[test]
    fn test_snap_within_tolerance() {
        assert_eq!(snap(402.0, &[400.0, 500.0], 6.0), 400.0);
    }

    #[test]
    fn test_snap_outside_tolerance_unchanged() {
        assert_eq!(snap(420.0, &[400.0, 500.0], 6.0), 420.0);
    }

    #[test]
    fn test_snap_first_match_wins() {
        // 403 is within 6 of both 400 and 406; the earlier line wins
        assert_eq!(snap(403.0, &[400.0, 406.0], 6.0), 400.0);
    }

    #[test]
    fn test_compute_guides_canvas_center_first() {
        let guides = compute_guides(800.0, 600.0, &[], None);
        assert_eq!(guides.vertical, vec![400.0]);
        assert_eq!(guides.horizontal, vec![300.0]);
    }

    #[test]
    fn test_compute_guides_sibling_edges_and_centers() {
        let layers = vec![layer("l1", 100.0, 50.0, 200.0, 80.0)];
        let guides = compute_guides(800.0, 600.0, &layers, None);
        // canvas center, left edge, right edge, horizontal center
        assert_eq!(guides.vertical, vec![400.0, 100.0, 300.0, 200.0]);
        assert_eq!(guides.horizontal, vec![300.0, 50.0, 130.0, 90.0]);
    }

    #[test]
    fn test_compute_guides_excludes_moving_layer() {
        let layers = vec![
            layer("moving", 10.0, 10.0, 20.0, 20.0),
            layer("other", 100.0, 100.0, 50.0, 50.0),
        ];
        let excluded = LayerRef::from_raw("moving");
        let guides = compute_guides(800.0, 600.0, &layers, Some(&excluded));
        assert!(!guides.vertical.contains(&10.0));
        assert!(guides.vertical.contains(&100.0));
    }

    #[test]
    fn test_compute_guides_dedupes_preserving_order() {
        let layers = vec![
            layer("a", 100.0, 100.0, 50.0, 50.0),
            layer("b", 100.0, 100.0, 50.0, 50.0),
        ];
        let guides = compute_guides(800.0, 600.0, &layers, None);
        assert_eq!(
            guides
                .vertical
                .iter()
                .filter(|&&v| v == 100.0)
                .count(),
            1
        );
    }

    #[test]
    fn test_snap_position_uses_center_indirection() {
        // Layer 100 wide, dragged so its center lands near the 400 guide
        let l = layer("l1", 0.0, 0.0, 100.0, 60.0);
        let guides = Guides {
            vertical: vec![400.0],
            horizontal: vec![300.0],
        };
        // x=348 puts the center at 398, within tolerance of 400
        let snapped = snap_position(&l, 348.0, 100.0, &guides, DEFAULT_SNAP_TOLERANCE);
        assert_eq!(snapped.x, 350.0); // center snapped to 400, minus 50
        assert_eq!(snapped.y, 100.0); // center 130 is nowhere near 300

        // Snapping the corner directly would have left x at 348
        assert_ne!(snapped.x, snap(348.0, &guides.vertical, DEFAULT_SNAP_TOLERANCE));
    }

    #[test]
    fn test_snap_position_axes_independent() {
        let l = layer("l1", 0.0, 0.0, 10.0, 10.0);
        let guides = Guides {
            vertical: vec![50.0],
            horizontal: vec![500.0],
        };
        let snapped = snap_position(&l, 43.0, 43.0, &guides, 6.0);
        assert_eq!(snapped.x, 45.0); // center 48 -> 50
        assert_eq!(snapped.y, 43.0); // center 48 far from 500
    }
}
