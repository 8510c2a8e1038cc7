//! Decoded paint trees.
//!
//! Font sources decode their raw paint records into [`PaintNode`] once, at
//! load time. Everything downstream matches on this closed set of variants
//! instead of probing loosely-named fields.

use crate::color::Rgba;
use serde::Serialize;

/// Reference from a paint node to an outline glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GlyphRef {
    Name(String),
    /// Numeric glyph id, resolved through the font's glyph order.
    Id(u32),
}

/// Palette index reserved for the text foreground color.
pub const FOREGROUND_PALETTE_INDEX: u16 = 0xFFFF;

/// Where a solid fill or gradient stop gets its color from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ColorRef {
    Palette { index: u16, alpha: f32 },
    Direct { rgba: Rgba },
    Foreground { alpha: f32 },
}

impl ColorRef {
    /// Maps a raw palette index, routing the reserved index to the foreground.
    pub fn from_palette_index(index: u16, alpha: f32) -> Self {
        if index == FOREGROUND_PALETTE_INDEX {
            ColorRef::Foreground { alpha }
        } else {
            ColorRef::Palette { index, alpha }
        }
    }

    pub fn palette_index(&self) -> Option<u16> {
        match self {
            ColorRef::Palette { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// The transform parts a single paint node may carry.
///
/// Parts compose in the fixed order `matrix * translate * scale * rotate * affine`,
/// so `affine` is the innermost operation applied to a point. Missing parts
/// are the identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocalTransform {
    /// Raw six-coefficient matrix `[xx, yx, xy, yy, dx, dy]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f64; 6]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<(f64, f64)>,
    /// Counter-clockwise rotation in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affine: Option<[f64; 6]>,
}

impl LocalTransform {
    pub fn matrix(coeffs: [f64; 6]) -> Self {
        Self { matrix: Some(coeffs), ..Self::default() }
    }

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self { translate: Some((dx, dy)), ..Self::default() }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self { scale: Some((sx, sy)), ..Self::default() }
    }

    pub fn rotate(radians: f64) -> Self {
        Self { rotate: Some(radians), ..Self::default() }
    }

    pub fn is_identity(&self) -> bool {
        self.matrix.is_none()
            && self.translate.is_none()
            && self.scale.is_none()
            && self.rotate.is_none()
            && self.affine.is_none()
    }
}

/// Gradient spread behavior outside the `[0, 1]` stop range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Extend {
    #[default]
    Pad,
    Repeat,
    Reflect,
}

/// Gradient geometry in glyph space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradientAnchors {
    Linear { x0: f64, y0: f64, x1: f64, y1: f64 },
    Radial { x0: f64, y0: f64, r0: f64, x1: f64, y1: f64, r1: f64 },
    /// Geometry that is neither linear nor radial (sweep gradients, or
    /// descriptions with no recognizable anchors).
    Unknown,
}

/// One color stop as found in the font. Either part may be missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawStop {
    pub offset: Option<f64>,
    pub color: Option<ColorRef>,
}

/// A gradient fill before stop normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawGradient {
    pub anchors: GradientAnchors,
    pub stops: Vec<RawStop>,
    pub extend: Extend,
}

/// A node of a decoded paint tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaintNode {
    /// Outline reference; the optional child paint describes its fill.
    Glyph {
        glyph: GlyphRef,
        #[serde(skip_serializing_if = "Option::is_none")]
        paint: Option<Box<PaintNode>>,
    },
    Solid { color: ColorRef },
    Gradient(RawGradient),
    Transform {
        transform: LocalTransform,
        paint: Box<PaintNode>,
    },
    Composite { children: Vec<PaintNode> },
}

impl PaintNode {
    pub fn glyph(glyph: GlyphRef, paint: PaintNode) -> Self {
        PaintNode::Glyph { glyph, paint: Some(Box::new(paint)) }
    }

    pub fn solid_palette(index: u16) -> Self {
        PaintNode::Solid { color: ColorRef::from_palette_index(index, 1.0) }
    }

    pub fn transformed(transform: LocalTransform, paint: PaintNode) -> Self {
        PaintNode::Transform { transform, paint: Box::new(paint) }
    }

    /// Wraps several nodes, collapsing the single-child case.
    pub fn composite(mut children: Vec<PaintNode>) -> Self {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        PaintNode::Composite { children }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreground_index_maps_to_foreground() {
        assert_eq!(
            ColorRef::from_palette_index(0xFFFF, 0.5),
            ColorRef::Foreground { alpha: 0.5 }
        );
        assert_eq!(ColorRef::from_palette_index(3, 1.0).palette_index(), Some(3));
    }

    #[test]
    fn test_composite_collapses_single_child() {
        let node = PaintNode::composite(vec![PaintNode::solid_palette(1)]);
        assert_eq!(node, PaintNode::solid_palette(1));
        let node = PaintNode::composite(vec![]);
        assert_eq!(node, PaintNode::Composite { children: vec![] });
    }

    #[test]
    fn test_paint_tree_serializes_with_type_tags() {
        let node = PaintNode::glyph(GlyphRef::Name("a".into()), PaintNode::solid_palette(2));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "glyph");
        assert_eq!(json["glyph"], "a");
        assert_eq!(json["paint"]["type"], "solid");
        assert_eq!(json["paint"]["color"]["index"], 2);
    }
}
