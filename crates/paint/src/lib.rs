//! Paint-graph traversal for layered color glyphs.
//!
//! A layer's paint tree is walked once, depth-first. The walk yields the
//! outline glyphs the layer draws, each under its accumulated transform, and
//! the first color or gradient found. [`palette`] and [`gradient`] then turn
//! those raw references into concrete fills.

pub mod gradient;
pub mod palette;
pub mod transform;
pub mod walker;

pub use gradient::normalize;
pub use palette::{PaletteLookupError, PaletteResolver};
pub use transform::{compose, local_affine};
pub use walker::{GlyphHit, LayerWalk, PaintVisitor, walk, walk_layer};
