use colrsplit_types::{ColorRef, Diagnostic, DiagnosticKind, Diagnostics, Palette, Rgba};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteLookupError {
    #[error("Palette index {index} out of range (palette has {len} entries)")]
    OutOfRange { index: u16, len: usize },

    #[error("Palette entry {index} is malformed: {reason}")]
    Malformed { index: u16, reason: String },

    #[error("Font has no usable palette")]
    NoPalette,
}

/// Resolves palette indices against one selected palette.
#[derive(Debug, Clone, Copy)]
pub struct PaletteResolver<'a> {
    palette: Option<&'a Palette>,
    foreground: Rgba,
}

impl<'a> PaletteResolver<'a> {
    pub fn new(palette: Option<&'a Palette>, foreground: Rgba) -> Self {
        Self { palette, foreground }
    }

    pub fn foreground(&self) -> Rgba {
        self.foreground
    }

    pub fn lookup(&self, index: u16) -> Result<Rgba, PaletteLookupError> {
        let palette = self.palette.ok_or(PaletteLookupError::NoPalette)?;
        let raw = palette
            .get(index)
            .ok_or(PaletteLookupError::OutOfRange { index, len: palette.len() })?;
        raw.to_rgba().ok_or_else(|| PaletteLookupError::Malformed {
            index,
            reason: format!("{:?}", raw),
        })
    }

    /// Resolves `index`, falling back to opaque black.
    ///
    /// A failed lookup is recorded as `palette_lookup_failed` against `layer`
    /// and never aborts the glyph.
    pub fn resolve(&self, index: u16, layer: usize, diagnostics: &mut Diagnostics) -> Rgba {
        match self.lookup(index) {
            Ok(rgba) => rgba,
            Err(e) => {
                log::debug!("[PALETTE] layer {}: {}", layer, e);
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::PaletteLookupFailed)
                        .at_layer(layer)
                        .with_detail(e.to_string()),
                );
                Rgba::BLACK
            }
        }
    }

    /// Resolves a color reference including its alpha multiplier.
    pub fn color(&self, color: &ColorRef) -> Result<Rgba, PaletteLookupError> {
        match *color {
            ColorRef::Direct { rgba } => Ok(rgba),
            ColorRef::Foreground { alpha } => Ok(self.foreground.scale_alpha(alpha)),
            ColorRef::Palette { index, alpha } => Ok(self.lookup(index)?.scale_alpha(alpha)),
        }
    }

    /// Like [`color`](Self::color), with the black fallback and diagnostic of
    /// [`resolve`](Self::resolve).
    pub fn resolve_color(&self, color: &ColorRef, layer: usize, diagnostics: &mut Diagnostics) -> Rgba {
        match *color {
            ColorRef::Palette { index, alpha } => self.resolve(index, layer, diagnostics).scale_alpha(alpha),
            _ => self.color(color).unwrap_or(Rgba::BLACK),
        }
    }

    /// Index of the first entry with a non-zero alpha, or 0.
    ///
    /// This is the color policy for layers that reference no color at all.
    /// It picks a plausible color, not necessarily the intended one.
    pub fn first_visible(&self) -> u16 {
        self.palette
            .and_then(|p| {
                p.entries
                    .iter()
                    .position(|raw| raw.to_rgba().is_some_and(|c| c.a > 0))
            })
            .map_or(0, |i| i as u16)
    }
}
