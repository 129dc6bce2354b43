//! # strata-render
//!
//! The Strata rendering engine. Takes a validated design snapshot and
//! produces a composited RGBA canvas: per-layer transforms run in
//! parallel, the z-ordered fold onto the canvas is strictly sequential.

pub mod compositor;
pub mod decode;
pub mod pipeline;
pub mod source;
pub mod transform;

pub use compositor::composite;
pub use pipeline::{render_design, RenderPipeline};
pub use source::{AssetSource, FsAssetSource, MemoryAssetSource};
pub use transform::{render_layer, RenderedLayer};
