//! Glyph export pipeline orchestration.
//!
//! - [`BatchBuilder`]: Fluent builder assembling font, config, executor and interrupt flag
//! - [`BatchRunner`]: Runs the per-glyph processor over a batch and writes the summary
//! - [`GlyphProcessor`]: Extraction, grouping and export of a single glyph
//!
//! # Example
//!
//! ```ignore
//! use colrsplit::{BatchBuilder, ExportConfig};
//!
//! let runner = BatchBuilder::new()
//!     .with_font_path("NotoColorEmoji.ttf")?
//!     .with_config(ExportConfig::default())
//!     .with_jobs(4)
//!     .build()?;
//!
//! let summary = runner.run(None)?;
//! ```

pub mod batch;
mod builder;
pub mod config;
pub mod glyph;
pub mod merge;

pub use batch::{BatchRunner, BatchState};
pub use builder::BatchBuilder;
pub use config::ExportConfig;
pub use glyph::{Extraction, GlyphOutput, GlyphProcessor};
pub use merge::{ExtractedSubpath, FillGroup};
