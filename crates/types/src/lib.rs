pub mod color;
pub mod diagnostic;
pub mod glyph;
pub mod gradient;
pub mod paint;

pub use color::{RawColor, Rgba};
pub use diagnostic::{Diagnostic, DiagnosticContext, DiagnosticKind, Diagnostics};
pub use glyph::{BaseGlyphRecord, ColorTables, FontMetrics, GlyphOrder, Palette};
pub use gradient::{ColorStop, Fill, GradientKind, GradientSpec};
pub use paint::{
    ColorRef, Extend, FOREGROUND_PALETTE_INDEX, GlyphRef, GradientAnchors, LocalTransform, PaintNode, RawGradient,
    RawStop,
};
