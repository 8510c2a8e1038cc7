use crate::color::Rgba;
use crate::paint::{Extend, GradientAnchors};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    Linear,
    Radial,
    Unknown,
}

impl GradientKind {
    pub fn of(anchors: &GradientAnchors) -> Self {
        match anchors {
            GradientAnchors::Linear { .. } => GradientKind::Linear,
            GradientAnchors::Radial { .. } => GradientKind::Radial,
            GradientAnchors::Unknown => GradientKind::Unknown,
        }
    }
}

/// A resolved gradient stop. Offsets lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba,
}

/// A normalized gradient: resolved stops sorted by offset, plus the transform
/// accumulated down to the node that declared it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientSpec {
    pub kind: GradientKind,
    pub anchors: GradientAnchors,
    pub stops: Vec<ColorStop>,
    pub extend: Extend,
    /// `[xx, yx, xy, yy, dx, dy]`
    pub transform: [f64; 6],
}

impl GradientSpec {
    pub fn first_color(&self) -> Option<Rgba> {
        self.stops.first().map(|s| s.color)
    }
}

/// The resolved fill of one layer group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "fill", rename_all = "snake_case")]
pub enum Fill {
    Solid { color: Rgba },
    Gradient(GradientSpec),
}

impl Fill {
    /// A single color standing in for the fill: the solid color, or the
    /// first stop of a gradient.
    pub fn representative_color(&self) -> Rgba {
        match self {
            Fill::Solid { color } => *color,
            Fill::Gradient(spec) => spec.first_color().unwrap_or(Rgba::BLACK),
        }
    }
}
