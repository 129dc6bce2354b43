use dashmap::DashMap;
use rayon::prelude::*;

use strata_core::{CancelToken, Canvas, StrataResult};
use strata_model::{AssetRef, Design, Layer};

use crate::compositor::composite;
use crate::decode::decode_image;
use crate::source::AssetSource;
use crate::transform::{render_layer, RenderedLayer};

/// The render pipeline: a design snapshot in, a composited canvas out.
///
/// Layer renders are independent (a pure function of the layer's own
/// attributes plus its decoded source) and run in parallel on the rayon
/// pool, which caps at the core count. The composite fold is strictly
/// sequential and starts only after every render has completed.
/// Decoded sources are cached across renders, keyed by asset id.
pub struct RenderPipeline {
    decode_cache: DashMap<String, Canvas>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self {
            decode_cache: DashMap::new(),
        }
    }

    /// Render a design snapshot to a canvas.
    ///
    /// The design is read once and never mutated; concurrent edits to
    /// the underlying records do not affect an export already in
    /// flight. Per-layer failures degrade (the layer is logged and
    /// omitted); cancellation aborts the whole export.
    pub fn render(
        &self,
        design: &Design,
        source: &dyn AssetSource,
        cancel: &CancelToken,
    ) -> StrataResult<Canvas> {
        if cancel.is_cancelled() {
            return Err(strata_core::StrataError::Cancelled);
        }

        tracing::info!(
            design = %design.id,
            layers = design.layers.len(),
            "rendering {}x{} design",
            design.width,
            design.height
        );

        let rendered: StrataResult<Vec<Option<RenderedLayer>>> = design
            .layers
            .par_iter()
            .map(|layer| self.render_one(layer, source))
            .collect();
        let rendered = rendered?;

        // Dropped partial output on cancellation, not a partial composite.
        if cancel.is_cancelled() {
            return Err(strata_core::StrataError::Cancelled);
        }

        Ok(composite(
            design.width,
            design.height,
            rendered.into_iter().flatten().collect(),
        ))
    }

    /// Render a single layer, degrading recoverable failures to a skip.
    fn render_one(
        &self,
        layer: &Layer,
        source: &dyn AssetSource,
    ) -> StrataResult<Option<RenderedLayer>> {
        if !layer.visible {
            return Ok(None);
        }

        let Some(asset) = &layer.asset else {
            // Transient local layers can exist without a resolved asset.
            tracing::debug!(layer = %layer.id, "layer has no asset; skipping");
            return Ok(None);
        };

        let decoded = match self.decode_asset(asset, source) {
            Ok(canvas) => canvas,
            Err(e) if e.is_layer_recoverable() => {
                tracing::warn!(layer = %layer.id, "skipping layer: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match render_layer(&decoded, layer) {
            Ok(rendered) => Ok(Some(rendered)),
            Err(e) if e.is_layer_recoverable() => {
                tracing::warn!(layer = %layer.id, "skipping layer: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch and decode an asset, with caching.
    fn decode_asset(&self, asset: &AssetRef, source: &dyn AssetSource) -> StrataResult<Canvas> {
        if let Some(cached) = self.decode_cache.get(&asset.id) {
            return Ok(cached.clone());
        }

        let bytes = source.fetch(asset)?;
        let canvas = decode_image(&bytes)?;
        self.decode_cache.insert(asset.id.clone(), canvas.clone());
        Ok(canvas)
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot convenience: render with a fresh pipeline and no
/// cancellation.
pub fn render_design(design: &Design, source: &dyn AssetSource) -> StrataResult<Canvas> {
    RenderPipeline::new().render(design, source, &CancelToken::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryAssetSource;
    use strata_model::LayerRef;

    fn png_bytes(rgba: [u8; 4], width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    fn image_layer(id: &str, asset_id: &str, w: f64, h: f64) -> Layer {
        let asset = AssetRef::new(asset_id, format!("{}.png", asset_id), "image/png");
        Layer::new(LayerRef::persisted(id), Some(asset), w, h)
    }

    #[test]
    fn test_render_solid_layer_covers_canvas() {
        let mut design = Design::new(4, 4);
        design.add_layer(image_layer("l1", "red", 4.0, 4.0));

        let mut source = MemoryAssetSource::new();
        source.insert("red", png_bytes([255, 0, 0, 255], 4, 4));

        let canvas = render_design(&design, &source).unwrap();
        assert_eq!(canvas.get_pixel(2, 2), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_missing_asset_degrades_not_fails() {
        let mut design = Design::new(4, 4);
        design.add_layer(image_layer("l1", "red", 4.0, 4.0));
        design.add_layer(image_layer("l2", "ghost", 4.0, 4.0).with_z_index(1));

        let mut source = MemoryAssetSource::new();
        source.insert("red", png_bytes([255, 0, 0, 255], 4, 4));

        // The export succeeds; only the resolvable layer appears
        let canvas = render_design(&design, &source).unwrap();
        assert_eq!(canvas.get_pixel(0, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_corrupt_asset_degrades_not_fails() {
        let mut design = Design::new(4, 4);
        design.add_layer(image_layer("l1", "junk", 4.0, 4.0));

        let mut source = MemoryAssetSource::new();
        source.insert("junk", vec![0x00, 0x01, 0x02]);

        let canvas = render_design(&design, &source).unwrap();
        assert_eq!(canvas.get_pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_layer_without_asset_skipped() {
        let mut design = Design::new(4, 4);
        design.add_layer(Layer::new(LayerRef::local("layer-1"), None, 4.0, 4.0));
        let source = MemoryAssetSource::new();
        let canvas = render_design(&design, &source).unwrap();
        assert_eq!(canvas.get_pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_cancelled_before_start() {
        let design = Design::new(4, 4);
        let source = MemoryAssetSource::new();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = RenderPipeline::new().render(&design, &source, &cancel);
        assert!(matches!(result, Err(strata_core::StrataError::Cancelled)));
    }

    #[test]
    fn test_decode_cache_shared_across_renders() {
        let mut design = Design::new(4, 4);
        design.add_layer(image_layer("l1", "red", 4.0, 4.0));

        let mut source = MemoryAssetSource::new();
        source.insert("red", png_bytes([255, 0, 0, 255], 4, 4));

        let pipeline = RenderPipeline::new();
        let cancel = CancelToken::new();
        let first = pipeline.render(&design, &source, &cancel).unwrap();

        // Second render hits the cache even if the source vanishes
        let empty = MemoryAssetSource::new();
        let second = pipeline.render(&design, &empty, &cancel).unwrap();
        assert_eq!(first, second);
    }
}
