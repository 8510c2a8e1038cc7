//! Field-name compatibility table for JSON font descriptions.
//!
//! Descriptions come from several exporters that disagree on naming. Every
//! accepted spelling of a field lives here, in priority order. Nothing
//! outside the JSON decoder looks at raw field names.

use serde_json::{Map, Value};

pub const GLYPH: &[&str] = &[
    "GlyphName",
    "Glyph",
    "GlyphID",
    "BaseGlyph",
    "BaseGlyphID",
    "glyphName",
    "glyph",
    "glyphID",
    "LayerGlyph",
];
pub const COLOR_INDEX: &[&str] = &["ColorIndex", "colorID", "PaletteIndex", "paletteIndex", "colorIndex", "PaletteIdx"];
pub const CHILDREN: &[&str] = &["Paints", "children", "Components", "Layers", "LayerArray", "PaintList", "Paint", "Fill"];
pub const ALPHA: &[&str] = &["Alpha", "alpha"];

pub const GRADIENT: &[&str] = &[
    "PaintLinearGradient",
    "PaintRadialGradient",
    "LinearGradient",
    "RadialGradient",
    "ColorLine",
    "ColorLines",
    "ColorStops",
    "Stops",
    "StopList",
    "StopsList",
    "Stop",
];
/// Stop lists nested inside a gradient or color-line object.
pub const STOP_LIST: &[&str] = &["ColorLine", "ColorStop", "ColorStops", "Stops", "stops"];
pub const STOP_OFFSET: &[&str] = &["Offset", "offset", "StopOffset", "stopOffset", "Position", "position"];
pub const STOP_COLOR: &[&str] = &["Color", "color", "PaletteIndex", "colorIndex", "ColorIndex"];
pub const EXTEND: &[&str] = &["Extend", "extend"];

pub const LINEAR_ANCHORS: &[[&str; 4]] = &[["x0", "y0", "x1", "y1"], ["X0", "Y0", "X1", "Y1"], ["x0", "y0", "x2", "y2"]];
pub const RADIAL_ANCHORS: &[[&str; 3]] = &[["cx", "cy", "r"], ["centerX", "centerY", "radius"], ["cx", "cy", "radius"]];

pub const TRANSFORM: &[&str] = &["Transform", "transform"];
pub const TRANSLATE: &[&str] = &["Translate", "translate"];
pub const SCALE: &[&str] = &["Scale", "scale"];
pub const ROTATE: &[&str] = &["Rotate", "rotate"];
pub const AFFINE: &[&str] = &["Affine", "affine"];

pub const BASE_GLYPHS: &[&str] = &["BaseGlyphRecords", "BaseGlyphList", "baseGlyphs", "base_glyphs"];
pub const LAYERS: &[&str] = &["LayerRecords", "LayerList", "layers", "Layers"];
pub const FIRST_LAYER: &[&str] = &["FirstLayerIndex", "firstLayerIndex", "first_layer_index", "LayerIndex"];
pub const NUM_LAYERS: &[&str] = &["NumLayers", "numLayers", "num_layers", "LayerCount"];
pub const BASE_PAINT: &[&str] = &["Paint", "paint"];

pub const COLR: &[&str] = &["COLR", "colr"];
pub const CPAL: &[&str] = &["CPAL", "cpal"];
pub const PALETTES: &[&str] = &["palettes", "Palettes", "ColorRecords"];

/// First present, non-null field among `names`.
pub fn first<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name).filter(|v| !v.is_null()))
}

pub fn first_f64(obj: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    names.iter().find_map(|name| obj.get(*name).and_then(Value::as_f64))
}

/// Reads a set of coordinate fields that must all be present.
pub fn all_f64<const N: usize>(obj: &Map<String, Value>, names: &[&str; N]) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    for (slot, name) in out.iter_mut().zip(names.iter()) {
        *slot = obj.get(*name)?.as_f64()?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_respects_priority_and_skips_null() {
        let v = json!({"glyph": "b", "GlyphName": null, "Glyph": "a"});
        let obj = v.as_object().unwrap();
        assert_eq!(first(obj, GLYPH), Some(&json!("a")));
    }

    #[test]
    fn test_all_f64_requires_every_field() {
        let v = json!({"x0": 1, "y0": 2.5, "x1": 3});
        let obj = v.as_object().unwrap();
        assert_eq!(all_f64(obj, &["x0", "y0", "x1"]), Some([1.0, 2.5, 3.0]));
        assert_eq!(all_f64(obj, &LINEAR_ANCHORS[0]), None);
    }
}
