// src/error.rs
use colrsplit_export::ExportError;
use colrsplit_traits::FontError;
use colrsplit_types::DiagnosticKind;
use thiserror::Error;

/// Failures that stop the whole run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration is invalid: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Config(e.to_string())
    }
}

/// Failures that abandon one glyph. The batch carries on with the next one.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No character of '{0}' is in the character map")]
    GlyphNotFound(String),

    #[error("Glyph '{0}' has no color base glyph record")]
    BaseGlyphNotMatched(String),

    #[error("Layer range of '{0}' cannot be read")]
    LayerRangeUnreadable(String),

    #[error("Glyph '{glyph}' resolves to an empty layer range (first {first:?}, count {count:?}, {total} layers)")]
    EmptyLayerRange {
        glyph: String,
        first: Option<usize>,
        count: Option<usize>,
        total: usize,
    },

    #[error("Glyph '{0}' produced no drawable fill groups")]
    NoFillGroups(String),

    #[error("Writing artifacts failed: {0}")]
    Export(#[from] ExportError),
}

impl ProcessError {
    /// The machine-readable reason recorded in the batch summary.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ProcessError::GlyphNotFound(_) => DiagnosticKind::GlyphNotFound,
            ProcessError::BaseGlyphNotMatched(_) => DiagnosticKind::BaseGlyphNotMatched,
            ProcessError::LayerRangeUnreadable(_) => DiagnosticKind::LayerRangeUnreadable,
            ProcessError::EmptyLayerRange { .. } => DiagnosticKind::EmptyLayerRange,
            ProcessError::NoFillGroups(_) => DiagnosticKind::NoFillGroups,
            ProcessError::Export(_) => DiagnosticKind::ExportFailed,
        }
    }
}
