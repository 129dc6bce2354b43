//! The sequential compositing stage.
//!
//! Blend order is a correctness requirement: each layer's "over" blend
//! depends on the accumulated result of everything beneath it, so this
//! stage always runs after every layer render has completed, in
//! z-order, with no partial or streaming variant.

use strata_core::Canvas;

use crate::transform::RenderedLayer;

/// Fold rendered layers onto a transparent canvas of the declared size.
///
/// Layers are sorted by ascending `z_index` with a stable sort, so ties
/// keep their original (insertion) order. Invisible layers never
/// contribute; regions outside the canvas bounds are clipped.
pub fn composite(canvas_width: u32, canvas_height: u32, layers: Vec<RenderedLayer>) -> Canvas {
    let mut ordered = layers;
    ordered.sort_by_key(|l| l.z_index);

    let mut canvas = Canvas::new(canvas_width, canvas_height);
    for layer in &ordered {
        if !layer.visible {
            continue;
        }
        canvas.composite_over(&layer.pixels, layer.origin_x, layer.origin_y, layer.opacity);
    }
    canvas
}
