//! # strata-core
//!
//! Core types and primitives for the Strata design compositor.
//! This crate contains foundational types shared across all Strata crates:
//! the RGBA canvas buffer, geometry primitives, content hashing,
//! cancellation, and error types.

pub mod cancel;
pub mod canvas;
pub mod error;
pub mod geom;
pub mod hash;

pub use cancel::CancelToken;
pub use canvas::Canvas;
pub use error::{StrataError, StrataResult};
pub use geom::{Point2D, Rect, Size2D};
pub use hash::{hash_canvas, ContentHash};
