//! Splits layered color-font glyphs into per-fill SVG layers.
//!
//! Each requested emoji's color layers are walked, their outlines pulled
//! into device space, grouped by fill and deduplicated, and written out as
//! one SVG per fill next to a metadata document recording where every piece
//! came from.

pub mod error;
pub mod interrupt;
pub mod pipeline;

pub use error::{PipelineError, ProcessError};
pub use interrupt::InterruptFlag;
pub use pipeline::{BatchBuilder, BatchRunner, BatchState, ExportConfig, GlyphProcessor};

pub use colrsplit_export::{BatchSummary, GlyphManifest, GlyphSummary};
pub use colrsplit_font::{JsonFont, OpenTypeFont, load_font};
pub use colrsplit_traits::FontSource;
pub use colrsplit_types::{Diagnostic, DiagnosticKind, Diagnostics, Rgba};
