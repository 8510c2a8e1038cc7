use colrsplit_traits::FontSource;
use colrsplit_types::{Diagnostic, DiagnosticKind, Diagnostics};
use kurbo::{Affine, BezPath};

/// Pulls transformed outlines out of a font source.
#[derive(Debug)]
pub struct OutlineExtractor<'a, F: FontSource + ?Sized> {
    font: &'a F,
}

impl<'a, F: FontSource + ?Sized> OutlineExtractor<'a, F> {
    pub fn new(font: &'a F) -> Self {
        Self { font }
    }

    /// Outline of `glyph_name` under `transform`.
    ///
    /// A font-side failure is logged as `extract_path_failed` against `layer`
    /// and yields `None`. A successful extraction is returned as-is, even
    /// when it has nothing drawable in it; judging that is the caller's job.
    pub fn extract(
        &self,
        glyph_name: &str,
        transform: Affine,
        layer: usize,
        diagnostics: &mut Diagnostics,
    ) -> Option<BezPath> {
        match self.font.outline(glyph_name, transform) {
            Ok(path) => Some(path),
            Err(e) => {
                log::debug!("[OUTLINE] layer {} glyph '{}': {}", layer, glyph_name, e);
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::ExtractPathFailed)
                        .at_layer(layer)
                        .for_glyph(glyph_name)
                        .with_detail(e.to_string()),
                );
                None
            }
        }
    }
}
