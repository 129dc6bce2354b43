use strata_core::{hash_canvas, CancelToken, Canvas};
use strata_model::{AssetRef, CropRect, Design, Layer, LayerRef};
use strata_render::{MemoryAssetSource, RenderPipeline};

fn png_bytes(img: &image::RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

fn solid_png(rgba: [u8; 4], width: u32, height: u32) -> Vec<u8> {
    png_bytes(&image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba(rgba),
    ))
}

fn image_layer(id: &str, asset_id: &str, width: f64, height: f64) -> Layer {
    let asset = AssetRef::new(asset_id, format!("{asset_id}.png"), "image/png");
    Layer::new(LayerRef::persisted(id), Some(asset), width, height)
}

fn render(design: &Design, source: &MemoryAssetSource) -> Canvas {
    RenderPipeline::new()
        .render(design, source, &CancelToken::new())
        .expect("render should succeed")
}

/// Opaque red base with a half-opacity blue square on top. Inside the
/// overlap the blend is exact: source alpha 128 over an opaque
/// destination gives (127, 0, 128, 255).
#[test]
fn test_half_opacity_blend_is_exact() {
    let mut source = MemoryAssetSource::new();
    source.insert("red", solid_png([255, 0, 0, 255], 200, 200));
    source.insert("blue", solid_png([0, 0, 255, 255], 50, 50));

    let mut design = Design::new(200, 200);
    design.add_layer(image_layer("base", "red", 200.0, 200.0));
    design.add_layer(
        image_layer("overlay", "blue", 50.0, 50.0)
            .with_position(50.0, 50.0)
            .with_opacity(0.5)
            .with_z_index(1),
    );

    let canvas = render(&design, &source);
    assert_eq!(canvas.get_pixel(60, 60), Some([127, 0, 128, 255]));
    // Outside the overlay the base shows through untouched
    assert_eq!(canvas.get_pixel(10, 10), Some([255, 0, 0, 255]));
    assert_eq!(canvas.get_pixel(150, 150), Some([255, 0, 0, 255]));
}

#[test]
fn test_render_is_deterministic() {
    let mut source = MemoryAssetSource::new();
    source.insert("red", solid_png([255, 0, 0, 255], 64, 64));
    source.insert("green", solid_png([0, 255, 0, 255], 32, 32));

    let mut design = Design::new(100, 100);
    design.add_layer(image_layer("base", "red", 100.0, 100.0));
    design.add_layer(
        image_layer("l1", "green", 40.0, 40.0)
            .with_position(30.0, 30.0)
            .with_rotation(33.0)
            .with_opacity(0.7)
            .with_z_index(1),
    );

    let first = render(&design, &source);
    let second = render(&design, &source);
    assert_eq!(hash_canvas(&first), hash_canvas(&second));
}

#[test]
fn test_z_index_decides_who_wins() {
    let mut source = MemoryAssetSource::new();
    source.insert("red", solid_png([255, 0, 0, 255], 10, 10));
    source.insert("blue", solid_png([0, 0, 255, 255], 10, 10));

    let mut design = Design::new(10, 10);
    design.add_layer(image_layer("a", "red", 10.0, 10.0).with_z_index(2));
    design.add_layer(image_layer("b", "blue", 10.0, 10.0).with_z_index(1));

    let canvas = render(&design, &source);
    // Red paints last despite appearing first in the list
    assert_eq!(canvas.get_pixel(5, 5), Some([255, 0, 0, 255]));
}

#[test]
fn test_full_turn_rotation_matches_unrotated() {
    let mut source = MemoryAssetSource::new();
    source.insert("tex", solid_png([10, 200, 30, 255], 20, 20));

    let mut design = Design::new(40, 40);
    design.add_layer(image_layer("l1", "tex", 20.0, 20.0).with_position(7.0, 3.0));

    let plain = render(&design, &source);

    design.layers[0].rotation = 720.0;
    let turned = render(&design, &source);

    assert_eq!(hash_canvas(&plain), hash_canvas(&turned));
}

#[test]
fn test_crop_selects_source_subregion() {
    // 2x1 source: left pixel red, right pixel blue
    let mut img = image::RgbaImage::new(2, 1);
    img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
    img.put_pixel(1, 0, image::Rgba([0, 0, 255, 255]));

    let mut source = MemoryAssetSource::new();
    source.insert("split", png_bytes(&img));

    let mut design = Design::new(4, 4);
    design.add_layer(
        image_layer("l1", "split", 4.0, 4.0).with_crop(CropRect::new(1.0, 0.0, 1.0, 1.0)),
    );

    let canvas = render(&design, &source);
    // Only the blue half survives the crop, stretched over the canvas
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(canvas.get_pixel(x, y), Some([0, 0, 255, 255]));
        }
    }
}

#[test]
fn test_unresolvable_layer_does_not_fail_the_export() {
    let mut source = MemoryAssetSource::new();
    source.insert("red", solid_png([255, 0, 0, 255], 10, 10));

    let mut design = Design::new(10, 10);
    design.add_layer(image_layer("base", "red", 10.0, 10.0));
    design.add_layer(
        image_layer("broken", "does-not-exist", 10.0, 10.0).with_z_index(5),
    );

    let canvas = render(&design, &source);
    assert_eq!(canvas.get_pixel(5, 5), Some([255, 0, 0, 255]));
}
