//! FontSource trait for abstracting access to a color font.
//!
//! The extraction pipeline never parses font files itself. It asks a
//! `FontSource` for decoded color tables, the character map, the glyph order
//! and outlines, so binary fonts and JSON font descriptions look the same to
//! the rest of the crate.

use colrsplit_types::{ColorTables, FontMetrics, GlyphOrder};
use kurbo::{Affine, BezPath};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Errors that make a font unusable as a whole. These abort a run.
#[derive(Error, Debug, Clone)]
pub enum FontError {
    #[error("Font has no '{0}' table")]
    MissingTable(&'static str),

    #[error("Failed to read font '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Font parsing error: {0}")]
    ParseError(String),

    #[error("Invalid font description: {0}")]
    InvalidDescription(String),
}

impl From<std::io::Error> for FontError {
    fn from(err: std::io::Error) -> Self {
        FontError::LoadFailed { path: String::new(), message: err.to_string() }
    }
}

/// Errors from decomposing a single glyph outline. Never fatal to a glyph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutlineError {
    #[error("Glyph '{0}' is not in the glyph order")]
    UnknownGlyph(String),

    #[error("Glyph '{glyph}' has a malformed outline: {message}")]
    Malformed { glyph: String, message: String },
}

/// Shared font data type (reference-counted bytes).
pub type SharedFontData = Arc<Vec<u8>>;

/// Read-only access to a loaded color font.
///
/// Implementations are shared across worker threads, so everything here
/// takes `&self` and must be cheap to call repeatedly.
///
/// # Implementations
///
/// - `OpenTypeFont`: binary OpenType/TrueType font with COLR and CPAL tables
/// - `JsonFont`: JSON font description, mostly used for tests and tooling
pub trait FontSource: Send + Sync + Debug {
    /// Display name used in logs.
    fn name(&self) -> &str;

    /// Decoded color-layer and palette tables.
    fn color_tables(&self) -> &ColorTables;

    fn glyph_order(&self) -> &GlyphOrder;

    /// Best-effort character map lookup.
    fn glyph_for_char(&self, c: char) -> Option<String>;

    /// Lowest codepoint mapped to `glyph_name`, if any.
    fn codepoint_for_glyph(&self, glyph_name: &str) -> Option<u32>;

    /// Decomposes `glyph_name` into a path with `transform` applied to every point.
    fn outline(&self, glyph_name: &str, transform: Affine) -> Result<BezPath, OutlineError>;

    fn metrics(&self) -> FontMetrics;
}

impl<T: FontSource + ?Sized> FontSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn color_tables(&self) -> &ColorTables {
        (**self).color_tables()
    }

    fn glyph_order(&self) -> &GlyphOrder {
        (**self).glyph_order()
    }

    fn glyph_for_char(&self, c: char) -> Option<String> {
        (**self).glyph_for_char(c)
    }

    fn codepoint_for_glyph(&self, glyph_name: &str) -> Option<u32> {
        (**self).codepoint_for_glyph(glyph_name)
    }

    fn outline(&self, glyph_name: &str, transform: Affine) -> Result<BezPath, OutlineError> {
        (**self).outline(glyph_name, transform)
    }

    fn metrics(&self) -> FontMetrics {
        (**self).metrics()
    }
}
