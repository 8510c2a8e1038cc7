use super::fields::{self, first, first_f64};
use crate::colr::{InlineGuard, MAX_PAINT_DEPTH, clamp_layer_range};
use colrsplit_types::{
    ColorRef, Extend, GlyphRef, GradientAnchors, LocalTransform, PaintNode, Palette, RawColor, RawGradient, RawStop,
    Rgba,
};
use serde_json::{Map, Value};

/// Decodes loosely-typed paint objects into [`PaintNode`] trees.
///
/// `layers` is the raw layer list, so nested layer-list references
/// (`FirstLayerIndex` + `NumLayers` inside a paint) can be inlined.
pub(crate) struct PaintDecoder<'a> {
    layers: &'a [Value],
    guard: InlineGuard,
}

impl<'a> PaintDecoder<'a> {
    pub fn new(layers: &'a [Value]) -> Self {
        Self { layers, guard: InlineGuard::default() }
    }

    pub fn decode(&self, value: &Value, depth: usize) -> PaintNode {
        if depth > MAX_PAINT_DEPTH {
            log::warn!("[JSON] paint nested deeper than {}, truncating", MAX_PAINT_DEPTH);
            return PaintNode::Composite { children: Vec::new() };
        }
        if !self.guard.spend() {
            return PaintNode::Composite { children: Vec::new() };
        }
        match value {
            Value::Array(items) => PaintNode::Composite {
                children: items.iter().map(|item| self.decode(item, depth + 1)).collect(),
            },
            Value::Object(obj) => self.decode_object(obj, depth),
            _ => PaintNode::Composite { children: Vec::new() },
        }
    }

    fn decode_object(&self, obj: &Map<String, Value>, depth: usize) -> PaintNode {
        let mut parts = Vec::new();

        if let Some(glyph) = first(obj, fields::GLYPH).and_then(glyph_ref) {
            parts.push(PaintNode::Glyph { glyph, paint: None });
        }
        if let Some(index) = color_index(obj) {
            parts.push(PaintNode::Solid { color: ColorRef::from_palette_index(index, alpha(obj)) });
        }
        if let Some(gradient) = gradient(obj) {
            parts.push(PaintNode::Gradient(gradient));
        }
        for name in fields::CHILDREN {
            if let Some(child) = obj.get(*name).filter(|v| !v.is_null()) {
                parts.push(self.decode(child, depth + 1));
            }
        }
        if let Some(range) = layer_reference(obj) {
            let range = clamp_layer_range(range.start, range.len(), self.layers.len());
            let inlined = self.guard.inline(range, |index| {
                self.layers.get(index).map(|layer| self.decode(layer, depth + 1))
            });
            parts.extend(inlined.into_iter().flatten());
        }

        let body = PaintNode::composite(parts);
        let local = local_transform(obj);
        if local.is_identity() { body } else { PaintNode::transformed(local, body) }
    }
}

fn glyph_ref(value: &Value) -> Option<GlyphRef> {
    match value {
        Value::String(name) => Some(GlyphRef::Name(name.clone())),
        Value::Number(n) => n.as_u64().and_then(|id| u32::try_from(id).ok()).map(GlyphRef::Id),
        _ => None,
    }
}

fn color_index(obj: &Map<String, Value>) -> Option<u16> {
    fields::COLOR_INDEX
        .iter()
        .find_map(|name| obj.get(*name).and_then(Value::as_u64))
        .and_then(|v| u16::try_from(v).ok())
}

fn alpha(obj: &Map<String, Value>) -> f32 {
    first_f64(obj, fields::ALPHA).map_or(1.0, |a| a as f32)
}

/// Range from an inline layer-list reference, if the object carries both fields.
pub(crate) fn layer_reference(obj: &Map<String, Value>) -> Option<std::ops::Range<usize>> {
    let start = non_negative(first(obj, fields::FIRST_LAYER)?)?;
    let count = non_negative(first(obj, fields::NUM_LAYERS)?)?;
    Some(start..start.saturating_add(count))
}

/// Integer field clamped at zero; `None` when it is not a number at all.
pub(crate) fn non_negative(value: &Value) -> Option<usize> {
    let n = value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))?;
    Some(n.max(0) as usize)
}

fn gradient(obj: &Map<String, Value>) -> Option<RawGradient> {
    let container = first(obj, fields::GRADIENT)?;
    let items = stop_items(container, 0).or_else(|| stop_items_in(obj, 0))?;
    let stops = items.iter().filter_map(raw_stop).collect();

    let container_obj = container.as_object();
    let anchors = container_obj
        .and_then(anchors)
        .or_else(|| anchors(obj))
        .unwrap_or(GradientAnchors::Unknown);
    let color_line = container_obj.and_then(|c| c.get("ColorLine")).and_then(Value::as_object);
    let extend = container_obj
        .and_then(|c| first(c, fields::EXTEND))
        .or_else(|| color_line.and_then(|c| first(c, fields::EXTEND)))
        .or_else(|| first(obj, fields::EXTEND))
        .map_or(Extend::Pad, extend);

    Some(RawGradient { anchors, stops, extend })
}

/// Finds the stop array in the several container shapes exporters produce:
/// a bare list, a color-line object, or a gradient object holding either.
fn stop_items(value: &Value, depth: usize) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => stop_items_in(obj, depth),
        _ => None,
    }
}

fn stop_items_in(obj: &Map<String, Value>, depth: usize) -> Option<&Vec<Value>> {
    if depth >= 3 {
        return None;
    }
    fields::STOP_LIST
        .iter()
        .filter_map(|name| obj.get(*name))
        .find_map(|inner| stop_items(inner, depth + 1))
}

fn raw_stop(value: &Value) -> Option<RawStop> {
    let obj = value.as_object()?;
    let offset = first_f64(obj, fields::STOP_OFFSET);
    let color = match first(obj, fields::STOP_COLOR) {
        Some(Value::Array(channels)) => channel_bytes(channels)
            .and_then(|c| RawColor::from_channels(&c).to_rgba())
            .map(|rgba| ColorRef::Direct { rgba }),
        Some(Value::String(hex)) => Rgba::parse_hex(hex).ok().map(|rgba| ColorRef::Direct { rgba }),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .map(|index| ColorRef::from_palette_index(index, alpha(obj))),
        _ => None,
    };
    let color = color.or_else(|| {
        obj.get("Paint")
            .and_then(find_color_index)
            .map(|index| ColorRef::from_palette_index(index, alpha(obj)))
    });
    Some(RawStop { offset, color })
}

fn find_color_index(value: &Value) -> Option<u16> {
    match value {
        Value::Object(obj) => color_index(obj).or_else(|| {
            fields::CHILDREN
                .iter()
                .filter_map(|name| obj.get(*name))
                .find_map(find_color_index)
        }),
        Value::Array(items) => items.iter().find_map(find_color_index),
        _ => None,
    }
}

fn channel_bytes(channels: &[Value]) -> Option<Vec<u8>> {
    channels
        .iter()
        .map(|c| c.as_u64().and_then(|v| u8::try_from(v).ok()))
        .collect()
}

fn has_radius(obj: &Map<String, Value>) -> bool {
    ["r", "r0", "r1", "radius"].iter().any(|k| obj.contains_key(*k))
}

/// Linear anchor sets are tried first, but only on objects without any
/// radius field; then the radial sets.
fn anchors(obj: &Map<String, Value>) -> Option<GradientAnchors> {
    if !has_radius(obj) {
        if let Some([x0, y0, x1, y1]) = fields::LINEAR_ANCHORS.iter().find_map(|set| fields::all_f64(obj, set)) {
            return Some(GradientAnchors::Linear { x0, y0, x1, y1 });
        }
    }
    if let Some([x0, y0, r0, x1, y1, r1]) = fields::all_f64(obj, &["x0", "y0", "r0", "x1", "y1", "r1"]) {
        return Some(GradientAnchors::Radial { x0, y0, r0, x1, y1, r1 });
    }
    fields::RADIAL_ANCHORS
        .iter()
        .find_map(|set| fields::all_f64(obj, set))
        .map(|[cx, cy, r]| GradientAnchors::Radial { x0: cx, y0: cy, r0: 0.0, x1: cx, y1: cy, r1: r })
}

fn extend(value: &Value) -> Extend {
    let name = match value {
        Value::String(s) => s.to_ascii_lowercase(),
        Value::Number(n) => match n.as_u64() {
            Some(1) => "repeat".to_string(),
            Some(2) => "reflect".to_string(),
            _ => "pad".to_string(),
        },
        _ => String::new(),
    };
    match name.as_str() {
        "repeat" => Extend::Repeat,
        "reflect" => Extend::Reflect,
        _ => Extend::Pad,
    }
}

fn num(obj: &Map<String, Value>, names: &[&str], default: f64) -> f64 {
    first_f64(obj, names).unwrap_or(default)
}

/// Rotation angles without an explicit unit are taken as degrees when
/// their magnitude exceeds a full turn in radians.
pub(crate) fn angle_heuristic(angle: f64) -> f64 {
    if angle.abs() > std::f64::consts::TAU { angle.to_radians() } else { angle }
}

fn local_transform(obj: &Map<String, Value>) -> LocalTransform {
    let mut local = LocalTransform::default();

    match first(obj, fields::TRANSFORM) {
        Some(Value::Object(t)) if t.contains_key("xx") => {
            local.matrix = Some([
                num(t, &["xx"], 1.0),
                num(t, &["yx"], 0.0),
                num(t, &["xy"], 0.0),
                num(t, &["yy"], 1.0),
                num(t, &["dx"], 0.0),
                num(t, &["dy"], 0.0),
            ]);
        }
        Some(Value::Object(t)) if t.contains_key("a") => local.matrix = Some(abcdef(t)),
        Some(Value::Array(items)) if items.len() == 6 => {
            let coeffs: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
            if let Some(c) = coeffs {
                local.matrix = Some([c[0], c[1], c[2], c[3], c[4], c[5]]);
            }
        }
        _ => {}
    }

    if let Some(Value::Object(t)) = first(obj, fields::TRANSLATE) {
        local.translate = Some((num(t, &["dx", "x"], 0.0), num(t, &["dy", "y"], 0.0)));
    }

    match first(obj, fields::SCALE) {
        Some(Value::Object(s)) => {
            let sx = num(s, &["sx", "x"], 1.0);
            local.scale = Some((sx, num(s, &["sy", "y"], sx)));
        }
        Some(Value::Number(n)) => {
            if let Some(k) = n.as_f64() {
                local.scale = Some((k, k));
            }
        }
        _ => {}
    }

    match first(obj, fields::ROTATE) {
        Some(Value::Object(r)) => {
            local.rotate = first_f64(r, &["angle"])
                .map(angle_heuristic)
                .or_else(|| first_f64(r, &["deg", "degrees"]).map(f64::to_radians))
                .or_else(|| first_f64(r, &["radians"]));
        }
        Some(Value::Number(n)) => local.rotate = n.as_f64().map(angle_heuristic),
        _ => {}
    }

    if let Some(Value::Object(a)) = first(obj, fields::AFFINE) {
        local.affine = Some(abcdef(a));
    }

    local
}

fn abcdef(obj: &Map<String, Value>) -> [f64; 6] {
    [
        num(obj, &["a"], 1.0),
        num(obj, &["b"], 0.0),
        num(obj, &["c"], 0.0),
        num(obj, &["d"], 1.0),
        num(obj, &["e"], 0.0),
        num(obj, &["f"], 0.0),
    ]
}

pub(crate) fn decode_palette(value: &Value) -> Palette {
    let entries = match value {
        Value::Array(entries) => entries.iter().map(raw_color).collect(),
        _ => Vec::new(),
    };
    Palette::new(entries)
}

fn raw_color(value: &Value) -> RawColor {
    match value {
        Value::Array(channels) => match channel_bytes(channels) {
            Some(bytes) => RawColor::from_channels(&bytes),
            None => RawColor::Malformed(format!("non-byte channel in {}", value)),
        },
        Value::String(hex) => match Rgba::parse_hex(hex) {
            Ok(c) => RawColor::Bgra([c.b, c.g, c.r, c.a]),
            Err(e) => RawColor::Malformed(e),
        },
        Value::Object(obj) => {
            let channel = |names: &[&str], default: Option<u64>| {
                first(obj, names)
                    .and_then(Value::as_u64)
                    .or(default)
                    .and_then(|v| u8::try_from(v).ok())
            };
            match (
                channel(&["blue", "Blue", "b"], None),
                channel(&["green", "Green", "g"], None),
                channel(&["red", "Red", "r"], None),
                channel(&["alpha", "Alpha", "a"], Some(255)),
            ) {
                (Some(b), Some(g), Some(r), Some(a)) => RawColor::Bgra([b, g, r, a]),
                _ => RawColor::Malformed(format!("incomplete color record {}", value)),
            }
        }
        other => RawColor::Malformed(format!("unsupported color entry {}", other)),
    }
}
