//! Decodes COLR/CPAL tables into [`ColorTables`].
//!
//! Paint graphs are flattened into owned [`PaintNode`] trees here, once per
//! font. Variation deltas are ignored; variable paints decode with their
//! default values.

use colrsplit_paint::transform::{rotate_around, scale_around, skew_around};
use colrsplit_types::{
    BaseGlyphRecord, ColorRef, ColorTables, Extend, GlyphOrder, GlyphRef, GradientAnchors, LocalTransform,
    PaintNode, Palette, RawColor, RawGradient, RawStop,
};
use kurbo::{Affine, Vec2};
use skrifa::GlyphId;
use skrifa::raw::ReadError;
use skrifa::raw::tables::colr::{self, Colr, Paint};
use skrifa::raw::tables::cpal::Cpal;
use skrifa::raw::types::F2Dot14;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::ops::Range;

/// Nesting limit for paint graphs. Deeper graphs are truncated with a warning.
pub const MAX_PAINT_DEPTH: usize = 64;

/// Upper bound on paint nodes decoded from one font. Layer lists that fan
/// out into each other can describe trees far larger than the font itself.
pub const MAX_PAINT_NODES: usize = 1 << 20;

/// Layer-list bookkeeping while a font's paint graphs are being inlined.
///
/// Tracks which layers are on the current inlining path, so a layer that
/// reaches itself again is dropped instead of unrolled, and counts decoded
/// nodes against [`MAX_PAINT_NODES`].
#[derive(Debug, Default)]
pub(crate) struct InlineGuard {
    active: RefCell<Vec<usize>>,
    decoded: Cell<usize>,
}

impl InlineGuard {
    /// Counts one decoded node. `false` once the budget is spent.
    pub fn spend(&self) -> bool {
        let decoded = self.decoded.get().saturating_add(1);
        self.decoded.set(decoded);
        if decoded == MAX_PAINT_NODES + 1 {
            log::warn!("[COLR] more than {} paint nodes, truncating the rest", MAX_PAINT_NODES);
        }
        decoded <= MAX_PAINT_NODES
    }

    /// Runs `decode` for every layer in `range` that is not already being
    /// inlined further up the path.
    pub fn inline<T>(&self, range: Range<usize>, mut decode: impl FnMut(usize) -> T) -> Vec<T> {
        let mut out = Vec::with_capacity(range.len());
        for index in range {
            if self.active.borrow().contains(&index) {
                log::warn!("[COLR] layer {} references itself, dropping the cycle", index);
                continue;
            }
            self.active.borrow_mut().push(index);
            out.push(decode(index));
            self.active.borrow_mut().pop();
        }
        out
    }
}

/// `first..first + count` cut down to the layers that exist.
pub(crate) fn clamp_layer_range(first: usize, count: usize, available: usize) -> Range<usize> {
    let end = first.saturating_add(count);
    if end > available {
        log::warn!(
            "[COLR] layer reference {}..{} runs past the {} available layers, clamping",
            first,
            end,
            available
        );
    }
    let end = end.min(available);
    first.min(end)..end
}

/// Decodes both COLRv1 base glyph paints and COLRv0 base glyph records into
/// one flat layer list.
///
/// Layout of the resulting list: the v1 LayerList first, then v0 layer
/// records, then one synthetic layer for every v1 base glyph whose root
/// paint is not a layer list. A glyph present in both versions keeps its v1
/// record.
pub fn decode_color_tables(colr: &Colr<'_>, cpal: &Cpal<'_>, order: &GlyphOrder) -> Result<ColorTables, ReadError> {
    let v1_layer_count = match colr.layer_list() {
        Some(list) => list?.num_layers() as usize,
        None => 0,
    };
    let decoder = PaintDecoder { colr, layer_count: v1_layer_count, guard: InlineGuard::default() };
    let mut layers: Vec<PaintNode> = Vec::new();
    let mut records: Vec<BaseGlyphRecord> = Vec::new();
    let mut seen: HashSet<u32> = HashSet::new();

    for index in 0..v1_layer_count {
        let node = match colr.v1_layer(index) {
            Ok((paint, _)) => decoder.decode(&paint, 0),
            Err(e) => {
                log::warn!("[COLR] layer {} unreadable: {}", index, e);
                PaintNode::Composite { children: Vec::new() }
            }
        };
        layers.push(node);
    }

    if let Some(list) = colr.base_glyph_list() {
        let list = list?;
        let mut synthetic = Vec::new();
        for record in list.base_glyph_paint_records() {
            let gid = record.glyph_id().to_u32();
            let Some((paint, _)) = colr.v1_base_glyph(GlyphId::new(gid))? else {
                continue;
            };
            seen.insert(gid);
            let name = glyph_name(order, gid);
            match paint {
                Paint::ColrLayers(root) => records.push(BaseGlyphRecord::new(
                    name,
                    gid,
                    root.first_layer_index() as usize,
                    root.num_layers() as usize,
                )),
                other => {
                    synthetic.push((name, gid, decoder.decode(&other, 0)));
                }
            }
        }
        // v0 layers sit between the v1 list and the synthetic layers
        let v0 = decode_v0(colr, order, layers.len(), &seen)?;
        layers.extend(v0.layers);
        records.extend(v0.records);
        for (name, gid, node) in synthetic {
            records.push(BaseGlyphRecord::new(name, gid, layers.len(), 1));
            layers.push(node);
        }
    } else {
        let v0 = decode_v0(colr, order, layers.len(), &seen)?;
        layers.extend(v0.layers);
        records.extend(v0.records);
    }

    let palettes = decode_palettes(cpal)?;
    log::debug!(
        "[COLR] decoded {} base glyphs, {} layers, {} palettes",
        records.len(),
        layers.len(),
        palettes.len()
    );
    Ok(ColorTables::new(records, layers, palettes))
}

struct V0Tables {
    records: Vec<BaseGlyphRecord>,
    layers: Vec<PaintNode>,
}

fn decode_v0(colr: &Colr<'_>, order: &GlyphOrder, offset: usize, skip: &HashSet<u32>) -> Result<V0Tables, ReadError> {
    let mut out = V0Tables { records: Vec::new(), layers: Vec::new() };
    if let Some(layer_records) = colr.layer_records() {
        for layer in layer_records? {
            let glyph = GlyphRef::Id(layer.glyph_id().to_u32());
            out.layers.push(PaintNode::glyph(glyph, PaintNode::solid_palette(layer.palette_index())));
        }
    }
    if let Some(base_records) = colr.base_glyph_records() {
        for base in base_records? {
            let gid = base.glyph_id().to_u32();
            if skip.contains(&gid) {
                continue;
            }
            out.records.push(BaseGlyphRecord::new(
                glyph_name(order, gid),
                gid,
                offset + base.first_layer_index() as usize,
                base.num_layers() as usize,
            ));
        }
    }
    Ok(out)
}

fn decode_palettes(cpal: &Cpal<'_>) -> Result<Vec<Palette>, ReadError> {
    let entries_per_palette = cpal.num_palette_entries() as usize;
    let records = match cpal.color_records_array() {
        Some(records) => records?,
        None => &[],
    };
    let palettes = cpal
        .color_record_indices()
        .iter()
        .map(|first| {
            let first = first.get() as usize;
            let entries = (first..first + entries_per_palette)
                .map(|i| match records.get(i) {
                    Some(rec) => RawColor::Bgra([rec.blue(), rec.green(), rec.red(), rec.alpha()]),
                    None => RawColor::Malformed(format!("color record {} out of range", i)),
                })
                .collect();
            Palette::new(entries)
        })
        .collect();
    Ok(palettes)
}

fn glyph_name(order: &GlyphOrder, gid: u32) -> String {
    order.name(gid).map_or_else(|| format!("gid{}", gid), str::to_owned)
}

struct PaintDecoder<'a, 'b> {
    colr: &'b Colr<'a>,
    layer_count: usize,
    guard: InlineGuard,
}

/// Extracts `[xx, yx, xy, yy, dx, dy]` from an Affine2x3 or VarAffine2x3.
macro_rules! affine_coeffs {
    ($m:expr) => {
        [
            $m.xx().to_f64(),
            $m.yx().to_f64(),
            $m.xy().to_f64(),
            $m.yy().to_f64(),
            $m.dx().to_f64(),
            $m.dy().to_f64(),
        ]
    };
}

/// Builds raw stops from a ColorLine or VarColorLine.
macro_rules! color_line {
    ($line:expr) => {{
        let line = $line;
        let stops = line
            .color_stops()
            .iter()
            .map(|stop| RawStop {
                offset: Some(stop.stop_offset().to_f32() as f64),
                color: Some(ColorRef::from_palette_index(stop.palette_index(), stop.alpha().to_f32())),
            })
            .collect::<Vec<_>>();
        (stops, map_extend(line.extend()))
    }};
}

impl<'a> PaintDecoder<'a, '_> {
    fn decode(&self, paint: &Paint<'a>, depth: usize) -> PaintNode {
        if depth > MAX_PAINT_DEPTH {
            log::warn!("[COLR] paint graph deeper than {}, truncating", MAX_PAINT_DEPTH);
            return PaintNode::Composite { children: Vec::new() };
        }
        if !self.guard.spend() {
            return PaintNode::Composite { children: Vec::new() };
        }
        match self.try_decode(paint, depth) {
            Ok(node) => node,
            Err(e) => {
                log::warn!("[COLR] skipping unreadable paint: {}", e);
                PaintNode::Composite { children: Vec::new() }
            }
        }
    }

    fn child(&self, paint: Result<Paint<'a>, ReadError>, depth: usize) -> Result<PaintNode, ReadError> {
        Ok(self.decode(&paint?, depth + 1))
    }

    fn wrap(&self, local: Affine, paint: Result<Paint<'a>, ReadError>, depth: usize) -> Result<PaintNode, ReadError> {
        let child = self.child(paint, depth)?;
        Ok(PaintNode::transformed(LocalTransform::matrix(local.as_coeffs()), child))
    }

    fn try_decode(&self, paint: &Paint<'a>, depth: usize) -> Result<PaintNode, ReadError> {
        let node = match paint {
            Paint::ColrLayers(layers) => {
                let range = clamp_layer_range(
                    layers.first_layer_index() as usize,
                    layers.num_layers() as usize,
                    self.layer_count,
                );
                let children = self
                    .guard
                    .inline(range, |index| -> Result<PaintNode, ReadError> {
                        let (layer, _) = self.colr.v1_layer(index)?;
                        Ok(self.decode(&layer, depth + 1))
                    })
                    .into_iter()
                    .collect::<Result<Vec<_>, _>>()?;
                PaintNode::Composite { children }
            }
            Paint::Solid(solid) => PaintNode::Solid {
                color: ColorRef::from_palette_index(solid.palette_index(), solid.alpha().to_f32()),
            },
            Paint::VarSolid(solid) => PaintNode::Solid {
                color: ColorRef::from_palette_index(solid.palette_index(), solid.alpha().to_f32()),
            },
            Paint::LinearGradient(g) => {
                let (stops, extend) = color_line!(g.color_line()?);
                let p = [g.x0(), g.y0(), g.x1(), g.y1(), g.x2(), g.y2()].map(|v| v.to_i16() as f64);
                PaintNode::Gradient(RawGradient { anchors: linear_anchors(p), stops, extend })
            }
            Paint::VarLinearGradient(g) => {
                let (stops, extend) = color_line!(g.color_line()?);
                let p = [g.x0(), g.y0(), g.x1(), g.y1(), g.x2(), g.y2()].map(|v| v.to_i16() as f64);
                PaintNode::Gradient(RawGradient { anchors: linear_anchors(p), stops, extend })
            }
            Paint::RadialGradient(g) => {
                let (stops, extend) = color_line!(g.color_line()?);
                let anchors = GradientAnchors::Radial {
                    x0: g.x0().to_i16() as f64,
                    y0: g.y0().to_i16() as f64,
                    r0: g.radius0().to_u16() as f64,
                    x1: g.x1().to_i16() as f64,
                    y1: g.y1().to_i16() as f64,
                    r1: g.radius1().to_u16() as f64,
                };
                PaintNode::Gradient(RawGradient { anchors, stops, extend })
            }
            Paint::VarRadialGradient(g) => {
                let (stops, extend) = color_line!(g.color_line()?);
                let anchors = GradientAnchors::Radial {
                    x0: g.x0().to_i16() as f64,
                    y0: g.y0().to_i16() as f64,
                    r0: g.radius0().to_u16() as f64,
                    x1: g.x1().to_i16() as f64,
                    y1: g.y1().to_i16() as f64,
                    r1: g.radius1().to_u16() as f64,
                };
                PaintNode::Gradient(RawGradient { anchors, stops, extend })
            }
            Paint::SweepGradient(g) => {
                let (stops, extend) = color_line!(g.color_line()?);
                PaintNode::Gradient(RawGradient { anchors: GradientAnchors::Unknown, stops, extend })
            }
            Paint::VarSweepGradient(g) => {
                let (stops, extend) = color_line!(g.color_line()?);
                PaintNode::Gradient(RawGradient { anchors: GradientAnchors::Unknown, stops, extend })
            }
            Paint::Glyph(g) => PaintNode::Glyph {
                glyph: GlyphRef::Id(g.glyph_id().to_u32()),
                paint: Some(Box::new(self.child(g.paint(), depth)?)),
            },
            Paint::ColrGlyph(g) => match self.colr.v1_base_glyph(GlyphId::new(g.glyph_id().to_u32()))? {
                Some((paint, _)) => self.decode(&paint, depth + 1),
                None => PaintNode::Composite { children: Vec::new() },
            },
            Paint::Transform(t) => {
                let coeffs = affine_coeffs!(t.transform()?);
                PaintNode::transformed(LocalTransform::matrix(coeffs), self.child(t.paint(), depth)?)
            }
            Paint::VarTransform(t) => {
                let coeffs = affine_coeffs!(t.transform()?);
                PaintNode::transformed(LocalTransform::matrix(coeffs), self.child(t.paint(), depth)?)
            }
            Paint::Translate(t) => PaintNode::transformed(
                LocalTransform::translate(t.dx().to_i16() as f64, t.dy().to_i16() as f64),
                self.child(t.paint(), depth)?,
            ),
            Paint::VarTranslate(t) => PaintNode::transformed(
                LocalTransform::translate(t.dx().to_i16() as f64, t.dy().to_i16() as f64),
                self.child(t.paint(), depth)?,
            ),
            Paint::Scale(s) => PaintNode::transformed(
                LocalTransform::scale(s.scale_x().to_f32() as f64, s.scale_y().to_f32() as f64),
                self.child(s.paint(), depth)?,
            ),
            Paint::VarScale(s) => PaintNode::transformed(
                LocalTransform::scale(s.scale_x().to_f32() as f64, s.scale_y().to_f32() as f64),
                self.child(s.paint(), depth)?,
            ),
            Paint::ScaleAroundCenter(s) => {
                let local = scale_around(
                    s.scale_x().to_f32() as f64,
                    s.scale_y().to_f32() as f64,
                    s.center_x().to_i16() as f64,
                    s.center_y().to_i16() as f64,
                );
                self.wrap(local, s.paint(), depth)?
            }
            Paint::VarScaleAroundCenter(s) => {
                let local = scale_around(
                    s.scale_x().to_f32() as f64,
                    s.scale_y().to_f32() as f64,
                    s.center_x().to_i16() as f64,
                    s.center_y().to_i16() as f64,
                );
                self.wrap(local, s.paint(), depth)?
            }
            Paint::ScaleUniform(s) => {
                let k = s.scale().to_f32() as f64;
                PaintNode::transformed(LocalTransform::scale(k, k), self.child(s.paint(), depth)?)
            }
            Paint::VarScaleUniform(s) => {
                let k = s.scale().to_f32() as f64;
                PaintNode::transformed(LocalTransform::scale(k, k), self.child(s.paint(), depth)?)
            }
            Paint::ScaleUniformAroundCenter(s) => {
                let k = s.scale().to_f32() as f64;
                let local = scale_around(k, k, s.center_x().to_i16() as f64, s.center_y().to_i16() as f64);
                self.wrap(local, s.paint(), depth)?
            }
            Paint::VarScaleUniformAroundCenter(s) => {
                let k = s.scale().to_f32() as f64;
                let local = scale_around(k, k, s.center_x().to_i16() as f64, s.center_y().to_i16() as f64);
                self.wrap(local, s.paint(), depth)?
            }
            Paint::Rotate(r) => {
                PaintNode::transformed(LocalTransform::rotate(half_turns(r.angle())), self.child(r.paint(), depth)?)
            }
            Paint::VarRotate(r) => {
                PaintNode::transformed(LocalTransform::rotate(half_turns(r.angle())), self.child(r.paint(), depth)?)
            }
            Paint::RotateAroundCenter(r) => {
                let local = rotate_around(half_turns(r.angle()), r.center_x().to_i16() as f64, r.center_y().to_i16() as f64);
                self.wrap(local, r.paint(), depth)?
            }
            Paint::VarRotateAroundCenter(r) => {
                let local = rotate_around(half_turns(r.angle()), r.center_x().to_i16() as f64, r.center_y().to_i16() as f64);
                self.wrap(local, r.paint(), depth)?
            }
            Paint::Skew(s) => {
                let local = skew_around(half_turns(s.x_skew_angle()), half_turns(s.y_skew_angle()), 0.0, 0.0);
                self.wrap(local, s.paint(), depth)?
            }
            Paint::VarSkew(s) => {
                let local = skew_around(half_turns(s.x_skew_angle()), half_turns(s.y_skew_angle()), 0.0, 0.0);
                self.wrap(local, s.paint(), depth)?
            }
            Paint::SkewAroundCenter(s) => {
                let local = skew_around(
                    half_turns(s.x_skew_angle()),
                    half_turns(s.y_skew_angle()),
                    s.center_x().to_i16() as f64,
                    s.center_y().to_i16() as f64,
                );
                self.wrap(local, s.paint(), depth)?
            }
            Paint::VarSkewAroundCenter(s) => {
                let local = skew_around(
                    half_turns(s.x_skew_angle()),
                    half_turns(s.y_skew_angle()),
                    s.center_x().to_i16() as f64,
                    s.center_y().to_i16() as f64,
                );
                self.wrap(local, s.paint(), depth)?
            }
            Paint::Composite(c) => PaintNode::Composite {
                children: vec![self.child(c.backdrop_paint(), depth)?, self.child(c.source_paint(), depth)?],
            },
            #[allow(unreachable_patterns)]
            _ => {
                log::warn!("[COLR] unsupported paint format {}", paint.format());
                PaintNode::Composite { children: Vec::new() }
            }
        };
        Ok(node)
    }
}

/// COLR angles are stored in half turns (1.0 == 180 degrees).
fn half_turns(angle: F2Dot14) -> f64 {
    (angle.to_f32() as f64 * 180.0).to_radians()
}

fn map_extend(extend: colr::Extend) -> Extend {
    match extend {
        colr::Extend::Repeat => Extend::Repeat,
        colr::Extend::Reflect => Extend::Reflect,
        _ => Extend::Pad,
    }
}

/// Reduces the three-point COLR linear gradient to a two-point one.
///
/// The gradient line runs from p0 to p1 projected onto the normal of the
/// p0→p2 rotation vector. A degenerate rotation vector leaves p1 as is.
fn linear_anchors([x0, y0, x1, y1, x2, y2]: [f64; 6]) -> GradientAnchors {
    let p0 = Vec2::new(x0, y0);
    let along = Vec2::new(x1, y1) - p0;
    let rotation = Vec2::new(x2, y2) - p0;
    let normal = Vec2::new(rotation.y, -rotation.x);
    let end = if normal.hypot2() > f64::EPSILON {
        p0 + normal * (along.dot(normal) / normal.hypot2())
    } else {
        p0 + along
    };
    GradientAnchors::Linear { x0, y0, x1: end.x, y1: end.y }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_anchors_perpendicular_rotation_point_is_identity() {
        // p2 straight above p0: the gradient line stays p0 -> p1
        let anchors = linear_anchors([0.0, 0.0, 100.0, 0.0, 0.0, 100.0]);
        assert_eq!(anchors, GradientAnchors::Linear { x0: 0.0, y0: 0.0, x1: 100.0, y1: 0.0 });
    }

    #[test]
    fn test_linear_anchors_project_onto_normal() {
        // p2 at 45 degrees: p1 projects onto the (1, -1) normal
        let anchors = linear_anchors([0.0, 0.0, 100.0, 0.0, 100.0, 100.0]);
        match anchors {
            GradientAnchors::Linear { x1, y1, .. } => {
                assert!((x1 - 50.0).abs() < 1e-9);
                assert!((y1 + 50.0).abs() < 1e-9);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_linear_anchors_degenerate_rotation() {
        let anchors = linear_anchors([5.0, 5.0, 10.0, 20.0, 5.0, 5.0]);
        assert_eq!(anchors, GradientAnchors::Linear { x0: 5.0, y0: 5.0, x1: 10.0, y1: 20.0 });
    }

    #[test]
    fn test_half_turns_to_radians() {
        assert!((half_turns(F2Dot14::from_f32(0.5)) - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn test_clamp_layer_range() {
        assert_eq!(clamp_layer_range(2, 3, 10), 2..5);
        assert_eq!(clamp_layer_range(8, 5, 10), 8..10);
        assert_eq!(clamp_layer_range(12, 5, 10), 10..10);
        assert_eq!(clamp_layer_range(1, usize::MAX, 4), 1..4);
    }

    #[test]
    fn test_inline_guard_drops_layers_already_on_the_path() {
        let guard = InlineGuard::default();
        let mut visits = Vec::new();
        guard.inline(0..2, |outer| {
            visits.push(outer);
            // every layer points back at the whole list
            let inner = guard.inline(0..2, |index| index);
            assert_eq!(inner, if outer == 0 { vec![1] } else { vec![0] });
        });
        assert_eq!(visits, vec![0, 1]);
    }

    #[test]
    fn test_inline_guard_budget() {
        let guard = InlineGuard::default();
        assert!((0..MAX_PAINT_NODES).all(|_| guard.spend()));
        assert!(!guard.spend());
        assert!(!guard.spend());
    }

    #[test]
    fn test_map_extend() {
        assert_eq!(map_extend(colr::Extend::Reflect), Extend::Reflect);
        assert_eq!(map_extend(colr::Extend::Pad), Extend::Pad);
    }
}
