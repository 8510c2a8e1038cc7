//! Output artifacts for extracted color layers.
//!
//! - [`svg`]: one SVG document per fill group
//! - [`manifest`]: per-glyph metadata and the batch summary
//! - [`writer`]: atomic file writes
//! - [`naming`]: codepoint directory and layer file names

mod error;
pub mod manifest;
pub mod naming;
pub mod svg;
pub mod writer;

pub use error::ExportError;
pub use manifest::{BatchSummary, ExportedLayer, GlyphManifest, GlyphSummary, GradientMeta, OriginalLayer};
pub use naming::{codepoint_dir_name, codepoint_labels, layer_file_name};
pub use svg::{SvgCanvas, SvgLayer, render_layer};
pub use writer::{write_atomic, write_json};
