use crate::transform::{compose, local_affine};
use colrsplit_types::{ColorRef, GlyphOrder, GlyphRef, PaintNode, RawGradient};
use kurbo::Affine;

/// Callbacks for a depth-first paint walk.
///
/// `transform` arguments are the full accumulated transform at the node,
/// ancestors included.
pub trait PaintVisitor {
    fn visit_glyph(&mut self, glyph: &GlyphRef, transform: Affine);
    fn visit_color(&mut self, color: &ColorRef);
    fn visit_gradient(&mut self, gradient: &RawGradient, transform: Affine);
}

/// Walks `node` depth-first, children in declaration order.
pub fn walk<V: PaintVisitor + ?Sized>(node: &PaintNode, ancestor: Affine, visitor: &mut V) {
    match node {
        PaintNode::Glyph { glyph, paint } => {
            visitor.visit_glyph(glyph, ancestor);
            if let Some(child) = paint {
                walk(child, ancestor, visitor);
            }
        }
        PaintNode::Solid { color } => visitor.visit_color(color),
        PaintNode::Gradient(gradient) => visitor.visit_gradient(gradient, ancestor),
        PaintNode::Transform { transform, paint } => {
            let combined = compose(ancestor, local_affine(transform));
            walk(paint, combined, visitor);
        }
        PaintNode::Composite { children } => {
            for child in children {
                walk(child, ancestor, visitor);
            }
        }
    }
}

/// A resolved outline reference and the transform it is drawn under.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphHit {
    pub glyph_name: String,
    pub transform: Affine,
}

/// Everything one layer's paint tree contributes.
///
/// Glyph references accumulate in walk order. Color and gradient keep the
/// first one found.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerWalk {
    pub glyphs: Vec<GlyphHit>,
    /// Glyph ids that did not resolve through the glyph order.
    pub unresolved: Vec<u32>,
    pub color: Option<ColorRef>,
    pub gradient: Option<(RawGradient, Affine)>,
    /// Transform of the first glyph reference, or the walk's starting transform.
    pub transform: Affine,
}

struct Collector<'a> {
    order: &'a GlyphOrder,
    walk: LayerWalk,
}

impl PaintVisitor for Collector<'_> {
    fn visit_glyph(&mut self, glyph: &GlyphRef, transform: Affine) {
        let name = match glyph {
            GlyphRef::Name(name) => Some(name.clone()),
            GlyphRef::Id(id) => self.order.name(*id).map(str::to_owned),
        };
        match name {
            Some(glyph_name) => {
                if self.walk.glyphs.is_empty() {
                    self.walk.transform = transform;
                }
                self.walk.glyphs.push(GlyphHit { glyph_name, transform });
            }
            None => {
                if let GlyphRef::Id(id) = glyph {
                    self.walk.unresolved.push(*id);
                }
            }
        }
    }

    fn visit_color(&mut self, color: &ColorRef) {
        if self.walk.color.is_none() {
            self.walk.color = Some(color.clone());
        }
    }

    fn visit_gradient(&mut self, gradient: &RawGradient, transform: Affine) {
        if self.walk.gradient.is_none() {
            self.walk.gradient = Some((gradient.clone(), transform));
        }
    }
}

/// Walks one layer and collects its glyphs, color and gradient.
///
/// Numeric glyph ids that fall outside the glyph order are reported in
/// `unresolved` rather than failing the walk.
pub fn walk_layer(node: &PaintNode, ancestor: Affine, order: &GlyphOrder) -> LayerWalk {
    let mut collector = Collector {
        order,
        walk: LayerWalk {
            glyphs: Vec::new(),
            unresolved: Vec::new(),
            color: None,
            gradient: None,
            transform: ancestor,
        },
    };
    walk(node, ancestor, &mut collector);
    collector.walk
}

#[cfg(test)]
mod tests {
    use super::*;
    use colrsplit_types::{Extend, GradientAnchors, LocalTransform, RawStop};
    use kurbo::Point;

    fn order() -> GlyphOrder {
        GlyphOrder::new(vec![".notdef".into(), "eye".into(), "mouth".into()])
    }

    #[test]
    fn test_glyph_id_resolves_through_order() {
        let node = PaintNode::glyph(GlyphRef::Id(2), PaintNode::solid_palette(4));
        let walk = walk_layer(&node, Affine::IDENTITY, &order());
        assert_eq!(walk.glyphs[0].glyph_name, "mouth");
        assert_eq!(walk.color.and_then(|c| c.palette_index()), Some(4));
    }

    #[test]
    fn test_unresolvable_glyph_yields_empty_list() {
        let node = PaintNode::glyph(GlyphRef::Id(99), PaintNode::solid_palette(0));
        let walk = walk_layer(&node, Affine::IDENTITY, &order());
        assert!(walk.glyphs.is_empty());
        assert_eq!(walk.unresolved, vec![99]);
    }

    #[test]
    fn test_first_color_wins() {
        let node = PaintNode::Composite {
            children: vec![
                PaintNode::glyph(GlyphRef::Name("eye".into()), PaintNode::solid_palette(1)),
                PaintNode::glyph(GlyphRef::Name("mouth".into()), PaintNode::solid_palette(2)),
            ],
        };
        let walk = walk_layer(&node, Affine::IDENTITY, &order());
        assert_eq!(walk.glyphs.len(), 2);
        assert_eq!(walk.color.and_then(|c| c.palette_index()), Some(1));
    }

    #[test]
    fn test_transforms_accumulate_outer_to_inner() {
        let node = PaintNode::transformed(
            LocalTransform::translate(10.0, 0.0),
            PaintNode::transformed(
                LocalTransform::scale(2.0, 2.0),
                PaintNode::glyph(GlyphRef::Name("eye".into()), PaintNode::solid_palette(1)),
            ),
        );
        let walk = walk_layer(&node, Affine::IDENTITY, &order());
        let p = walk.glyphs[0].transform * Point::new(1.0, 0.0);
        assert!((p.x - 12.0).abs() < 1e-9 && p.y.abs() < 1e-9);
        assert_eq!(walk.transform, walk.glyphs[0].transform);
    }

    #[test]
    fn test_sibling_transform_does_not_leak() {
        let node = PaintNode::Composite {
            children: vec![
                PaintNode::transformed(
                    LocalTransform::translate(5.0, 5.0),
                    PaintNode::glyph(GlyphRef::Name("eye".into()), PaintNode::solid_palette(1)),
                ),
                PaintNode::glyph(GlyphRef::Name("mouth".into()), PaintNode::solid_palette(1)),
            ],
        };
        let walk = walk_layer(&node, Affine::IDENTITY, &order());
        assert_eq!(walk.glyphs[1].transform, Affine::IDENTITY);
    }

    #[test]
    fn test_gradient_keeps_its_transform() {
        let gradient = RawGradient {
            anchors: GradientAnchors::Unknown,
            stops: vec![RawStop { offset: None, color: None }],
            extend: Extend::Pad,
        };
        let node = PaintNode::glyph(
            GlyphRef::Name("eye".into()),
            PaintNode::transformed(LocalTransform::translate(0.0, 7.0), PaintNode::Gradient(gradient.clone())),
        );
        let walk = walk_layer(&node, Affine::IDENTITY, &order());
        let (found, transform) = walk.gradient.unwrap();
        assert_eq!(found, gradient);
        assert_eq!(transform, Affine::translate((0.0, 7.0)));
        assert_eq!(walk.glyphs[0].transform, Affine::IDENTITY);
    }
}
