use serde::Serialize;
use std::fmt;

/// Machine-readable category of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    // Recoverable, local to one layer or glyph reference
    PaletteLookupFailed,
    PaletteFallback,
    MissingColorIndex,
    NoGlyphExtracted,
    UnresolvedGlyphRef,
    ExtractPathFailed,
    InvalidPathSkipped,
    PathTooShort,
    DuplicatePathCollapsed,
    EmptyGroupDropped,
    GradientWithoutStops,
    UnknownGradientKind,
    // Glyph-fatal
    GlyphNotFound,
    BaseGlyphNotMatched,
    LayerRangeUnreadable,
    EmptyLayerRange,
    NoFillGroups,
    ExportFailed,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::PaletteLookupFailed => "palette_lookup_failed",
            DiagnosticKind::PaletteFallback => "palette_fallback",
            DiagnosticKind::MissingColorIndex => "missing_color_index",
            DiagnosticKind::NoGlyphExtracted => "no_glyph_extracted",
            DiagnosticKind::UnresolvedGlyphRef => "unresolved_glyph_ref",
            DiagnosticKind::ExtractPathFailed => "extract_path_failed",
            DiagnosticKind::InvalidPathSkipped => "invalid_path_skipped",
            DiagnosticKind::PathTooShort => "path_too_short",
            DiagnosticKind::DuplicatePathCollapsed => "duplicate_path_collapsed",
            DiagnosticKind::EmptyGroupDropped => "empty_group_dropped",
            DiagnosticKind::GradientWithoutStops => "gradient_without_stops",
            DiagnosticKind::UnknownGradientKind => "unknown_gradient_kind",
            DiagnosticKind::GlyphNotFound => "glyph_not_found",
            DiagnosticKind::BaseGlyphNotMatched => "base_glyph_not_matched",
            DiagnosticKind::LayerRangeUnreadable => "layer_range_unreadable",
            DiagnosticKind::EmptyLayerRange => "empty_layer_range",
            DiagnosticKind::NoFillGroups => "no_fill_groups",
            DiagnosticKind::ExportFailed => "export_failed",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the glyph a diagnostic was raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub context: DiagnosticContext,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind) -> Self {
        Self { context: DiagnosticContext::default(), kind, detail: None }
    }

    pub fn at_layer(mut self, layer: usize) -> Self {
        self.context.layer = Some(layer);
        self
    }

    pub fn for_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.context.glyph = Some(glyph.into());
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.context.group = Some(group.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Append-only diagnostic log for one glyph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn append(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.0.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}
