//! Metadata documents written next to the SVG layers.

use chrono::{DateTime, Utc};
use colrsplit_types::{ColorStop, Diagnostic, Extend, GradientAnchors, GradientKind, GradientSpec, Rgba};
use indexmap::IndexMap;
use serde::Serialize;

/// Gradient description carried by exported layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientMeta {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub coords: IndexMap<&'static str, f64>,
    pub stops: Vec<ColorStop>,
    pub extend: Extend,
    pub transform: [f64; 6],
}

impl GradientMeta {
    pub fn new(id: impl Into<String>, spec: &GradientSpec) -> Self {
        Self {
            id: id.into(),
            kind: spec.kind,
            coords: anchor_coords(&spec.anchors),
            stops: spec.stops.clone(),
            extend: spec.extend,
            transform: spec.transform,
        }
    }
}

/// Named anchor coordinates, in a stable order.
pub fn anchor_coords(anchors: &GradientAnchors) -> IndexMap<&'static str, f64> {
    match *anchors {
        GradientAnchors::Linear { x0, y0, x1, y1 } => [("x0", x0), ("y0", y0), ("x1", x1), ("y1", y1)].into_iter().collect(),
        GradientAnchors::Radial { x0, y0, r0, x1, y1, r1 } => [
            ("cx", x1),
            ("cy", y1),
            ("r", r1),
            ("fx", x0),
            ("fy", y0),
            ("fr", r0),
        ]
        .into_iter()
        .collect(),
        GradientAnchors::Unknown => IndexMap::new(),
    }
}

/// One written SVG file: a fill group after deduplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedLayer {
    pub index: usize,
    pub group_key: String,
    /// Source layers that contributed a kept subpath, in first-seen order.
    pub merged_layer_indices: Vec<usize>,
    pub glyph_names: Vec<String>,
    /// Solid color, or the first stop of a gradient fill.
    pub color: Rgba,
    pub hex: String,
    pub svg_file_name: String,
    pub subpath_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<GradientMeta>,
}

/// One (layer, glyph) pair as found before grouping. Layers without any
/// glyph produce a single record with `glyph_name: None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginalLayer {
    pub layer_index_global: usize,
    pub layer_index_local: usize,
    pub glyph_name: Option<String>,
    pub color: Rgba,
    pub hex: String,
    /// `[xx, yx, xy, yy, dx, dy]`
    pub matrix: [f64; 6],
    /// Fill group the path was assigned to. Absent for placeholders and invalid paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphManifest {
    pub emoji_char: String,
    pub emoji_codepoints: Vec<String>,
    pub glyph_name: String,
    pub layers: Vec<ExportedLayer>,
    pub original_layers: Vec<OriginalLayer>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of one requested emoji inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphSummary {
    pub emoji: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
    pub exported: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub processed_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub interrupted: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub glyphs: Vec<GlyphSummary>,
}
