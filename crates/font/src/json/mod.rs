//! JSON font descriptions.
//!
//! A description is a single JSON object carrying a glyph order, a character
//! map, SVG path data per glyph and fontTools-style `COLR`/`CPAL` sections.
//! Field names vary between exporters; [`fields`] lists every accepted
//! spelling.

mod decode;
pub(crate) mod fields;

use self::decode::{PaintDecoder, decode_palette, layer_reference, non_negative};
use self::fields::first;
use colrsplit_traits::{FontError, FontSource, OutlineError};
use colrsplit_types::{BaseGlyphRecord, ColorTables, FontMetrics, GlyphOrder, PaintNode};
use kurbo::{Affine, BezPath};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A color font assembled from a JSON description.
#[derive(Debug)]
pub struct JsonFont {
    name: String,
    tables: ColorTables,
    order: GlyphOrder,
    cmap: HashMap<u32, String>,
    lowest_codepoint: HashMap<String, u32>,
    outlines: HashMap<String, String>,
    metrics: FontMetrics,
}

impl JsonFont {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| FontError::LoadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| FontError::ParseError(e.to_string()))?;
        let stem = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        Self::from_value(&stem, &value)
    }

    pub fn from_json(name: &str, text: &str) -> Result<Self, FontError> {
        let value: Value = serde_json::from_str(text).map_err(|e| FontError::ParseError(e.to_string()))?;
        Self::from_value(name, &value)
    }

    /// Builds a font from an already-parsed description. `fallback_name` is
    /// used when the description carries no `name` field.
    pub fn from_value(fallback_name: &str, value: &Value) -> Result<Self, FontError> {
        let root = value
            .as_object()
            .ok_or_else(|| FontError::InvalidDescription("top level must be an object".to_string()))?;

        let name = root
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(fallback_name)
            .to_string();
        let outlines = read_outlines(root);
        let order = read_glyph_order(root, &outlines);
        let (cmap, lowest_codepoint) = read_cmap(root, &order);
        let metrics = read_metrics(root);

        let colr = section(root, fields::COLR, fields::BASE_GLYPHS).ok_or(FontError::MissingTable("COLR"))?;
        let cpal = first(root, fields::CPAL)
            .or_else(|| first(root, fields::PALETTES))
            .ok_or(FontError::MissingTable("CPAL"))?;
        let tables = read_color_tables(colr, cpal, &order)?;

        log::info!(
            "[FONT] loaded JSON description '{}': {} glyphs, {} color base glyphs, {} layers",
            name,
            order.len(),
            tables.base_glyphs.len(),
            tables.layers.len()
        );

        Ok(Self { name, tables, order, cmap, lowest_codepoint, outlines, metrics })
    }
}

/// A table section, either nested under one of `names` or spread over the
/// root object (recognized by its `marker` fields).
fn section<'a>(root: &'a Map<String, Value>, names: &[&str], marker: &[&str]) -> Option<&'a Map<String, Value>> {
    first(root, names)
        .and_then(Value::as_object)
        .or_else(|| first(root, marker).map(|_| root))
}

fn read_outlines(root: &Map<String, Value>) -> HashMap<String, String> {
    let Some(glyphs) = root.get("glyphs").and_then(Value::as_object) else {
        return HashMap::new();
    };
    glyphs
        .iter()
        .filter_map(|(name, glyph)| {
            let d = match glyph {
                Value::String(d) => d.clone(),
                Value::Object(obj) => obj.get("d").and_then(Value::as_str)?.to_string(),
                _ => return None,
            };
            Some((name.clone(), d))
        })
        .collect()
}

fn read_glyph_order(root: &Map<String, Value>, outlines: &HashMap<String, String>) -> GlyphOrder {
    if let Some(names) = root.get("glyphOrder").and_then(Value::as_array) {
        return GlyphOrder::new(
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
        );
    }
    let mut names: Vec<String> = outlines.keys().filter(|n| n.as_str() != ".notdef").cloned().collect();
    names.sort();
    names.insert(0, ".notdef".to_string());
    GlyphOrder::new(names)
}

/// Accepts `U+1F600`, `0x1F600`, a single literal character, or a decimal
/// string of two or more digits. A lone digit is the character itself.
pub(crate) fn parse_codepoint(key: &str) -> Option<u32> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c as u32);
    }
    let key = key.trim();
    if let Some(hex) = key.strip_prefix("U+").or_else(|| key.strip_prefix("u+")) {
        return u32::from_str_radix(hex, 16).ok();
    }
    if let Some(hex) = key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok();
    }
    key.parse::<u32>().ok()
}

fn read_cmap(root: &Map<String, Value>, order: &GlyphOrder) -> (HashMap<u32, String>, HashMap<String, u32>) {
    let mut forward = HashMap::new();
    let mut lowest: HashMap<String, u32> = HashMap::new();
    let Some(cmap) = root.get("cmap").and_then(Value::as_object) else {
        return (forward, lowest);
    };
    // sorted so the lowest codepoint wins deterministically
    let entries: BTreeMap<u32, String> = cmap
        .iter()
        .filter_map(|(key, glyph)| {
            let cp = parse_codepoint(key)?;
            let name = match glyph {
                Value::String(name) => name.clone(),
                Value::Number(n) => order.name(u32::try_from(n.as_u64()?).ok()?)?.to_string(),
                _ => return None,
            };
            Some((cp, name))
        })
        .collect();
    for (cp, name) in entries {
        lowest.entry(name.clone()).or_insert(cp);
        forward.insert(cp, name);
    }
    (forward, lowest)
}

fn read_metrics(root: &Map<String, Value>) -> FontMetrics {
    let defaults = FontMetrics::default();
    FontMetrics {
        units_per_em: fields::first_f64(root, &["unitsPerEm", "upem"]).map_or(defaults.units_per_em, |v| v as u16),
        ascender: fields::first_f64(root, &["ascender"]).map_or(defaults.ascender, |v| v as i16),
        descender: fields::first_f64(root, &["descender"]).map_or(defaults.descender, |v| v as i16),
    }
}

fn read_color_tables(colr: &Map<String, Value>, cpal: &Value, order: &GlyphOrder) -> Result<ColorTables, FontError> {
    let raw_layers: &[Value] = first(colr, fields::LAYERS)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let decoder = PaintDecoder::new(raw_layers);
    let mut layers: Vec<PaintNode> = raw_layers.iter().map(|layer| decoder.decode(layer, 0)).collect();

    let records = match first(colr, fields::BASE_GLYPHS) {
        Some(Value::Array(records)) => records.iter().map(|r| (None, r)).collect::<Vec<_>>(),
        Some(Value::Object(by_name)) => by_name.iter().map(|(k, r)| (Some(k.as_str()), r)).collect(),
        Some(_) => {
            return Err(FontError::InvalidDescription("base glyph records must be a list or map".to_string()));
        }
        None => Vec::new(),
    };

    let mut base_glyphs = Vec::with_capacity(records.len());
    for (key, record) in records {
        let Some(obj) = record.as_object() else {
            log::warn!("[JSON] skipping non-object base glyph record");
            continue;
        };
        let (glyph_name, glyph_id) = match (first(obj, fields::GLYPH), key) {
            (Some(Value::String(name)), _) => (name.clone(), order.id(name).unwrap_or(u32::MAX)),
            (Some(Value::Number(n)), _) => {
                let gid = n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(u32::MAX);
                let name = order.name(gid).map_or_else(|| format!("gid{}", gid), str::to_owned);
                (name, gid)
            }
            (_, Some(name)) => (name.to_string(), order.id(name).unwrap_or(u32::MAX)),
            _ => {
                log::warn!("[JSON] skipping base glyph record without a glyph");
                continue;
            }
        };

        let mut record = BaseGlyphRecord {
            glyph_name,
            glyph_id,
            first_layer_index: first(obj, fields::FIRST_LAYER).and_then(non_negative),
            num_layers: first(obj, fields::NUM_LAYERS).and_then(non_negative),
            paint: None,
        };
        let has_range_fields = first(obj, fields::FIRST_LAYER).is_some() || first(obj, fields::NUM_LAYERS).is_some();

        match first(obj, fields::BASE_PAINT) {
            Some(paint) if has_range_fields => {
                record.paint = Some(decoder.decode(paint, 0));
            }
            Some(paint) => match paint.as_object().and_then(layer_reference) {
                Some(range) => {
                    record.first_layer_index = Some(range.start);
                    record.num_layers = Some(range.len());
                }
                None => {
                    // root paint without a layer list becomes its own layer
                    record.first_layer_index = Some(layers.len());
                    record.num_layers = Some(1);
                    layers.push(decoder.decode(paint, 0));
                }
            },
            None => {}
        }
        base_glyphs.push(record);
    }

    let palettes = match cpal {
        Value::Array(palettes) => palettes.iter().map(decode_palette).collect(),
        Value::Object(obj) => first(obj, fields::PALETTES)
            .and_then(Value::as_array)
            .map(|palettes| palettes.iter().map(decode_palette).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    Ok(ColorTables::new(base_glyphs, layers, palettes))
}

impl FontSource for JsonFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn color_tables(&self) -> &ColorTables {
        &self.tables
    }

    fn glyph_order(&self) -> &GlyphOrder {
        &self.order
    }

    fn glyph_for_char(&self, c: char) -> Option<String> {
        self.cmap.get(&(c as u32)).cloned()
    }

    fn codepoint_for_glyph(&self, glyph_name: &str) -> Option<u32> {
        self.lowest_codepoint.get(glyph_name).copied()
    }

    fn outline(&self, glyph_name: &str, transform: Affine) -> Result<BezPath, OutlineError> {
        let d = self
            .outlines
            .get(glyph_name)
            .ok_or_else(|| OutlineError::UnknownGlyph(glyph_name.to_string()))?;
        let path = BezPath::from_svg(d).map_err(|e| OutlineError::Malformed {
            glyph: glyph_name.to_string(),
            message: e.to_string(),
        })?;
        Ok(transform * path)
    }

    fn metrics(&self) -> FontMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colrsplit_types::{ColorRef, GlyphRef, RawColor};
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "name": "sample",
            "unitsPerEm": 2048,
            "glyphs": {
                "smile": "M0 0 L100 0 L100 100 Z",
                "eye": {"d": "M10 10 L20 10 L20 20 Z"}
            },
            "cmap": {"U+1F600": "smile", "0x1F601": "smile", "A": "eye"},
            "COLR": {
                "BaseGlyphRecords": [
                    {"BaseGlyph": "smile", "FirstLayerIndex": 0, "NumLayers": 2}
                ],
                "LayerRecords": [
                    {"LayerGlyph": "smile", "PaletteIndex": 0},
                    {"LayerGlyph": "eye", "PaletteIndex": 1}
                ]
            },
            "CPAL": {"palettes": [[[0, 0, 255, 255], [255, 0, 0, 255]]]}
        })
    }

    #[test]
    fn test_loads_sections_and_metrics() {
        let font = JsonFont::from_value("fallback", &sample()).unwrap();
        assert_eq!(font.name(), "sample");
        assert_eq!(font.metrics().units_per_em, 2048);
        assert_eq!(font.glyph_order().name(0), Some(".notdef"));
        let tables = font.color_tables();
        assert_eq!(tables.layers.len(), 2);
        let record = tables.base_glyph("smile").unwrap();
        assert_eq!(record.layer_range(tables.layers.len()), Some(0..2));
        assert_eq!(tables.palettes[0].entries[0], RawColor::Bgra([0, 0, 255, 255]));
    }

    #[test]
    fn test_cmap_key_forms_and_lowest_codepoint() {
        let font = JsonFont::from_value("f", &sample()).unwrap();
        assert_eq!(font.glyph_for_char('\u{1F600}'), Some("smile".to_string()));
        assert_eq!(font.glyph_for_char('\u{1F601}'), Some("smile".to_string()));
        assert_eq!(font.glyph_for_char('A'), Some("eye".to_string()));
        assert_eq!(font.codepoint_for_glyph("smile"), Some(0x1F600));
    }

    #[test]
    fn test_outline_applies_transform() {
        let font = JsonFont::from_value("f", &sample()).unwrap();
        let path = font.outline("eye", Affine::translate((5.0, 0.0))).unwrap();
        let first = path.elements()[0];
        assert_eq!(first, kurbo::PathEl::MoveTo(kurbo::Point::new(15.0, 10.0)));
        assert!(matches!(font.outline("nope", Affine::IDENTITY), Err(OutlineError::UnknownGlyph(_))));
    }

    #[test]
    fn test_missing_colr_is_missing_table() {
        let err = JsonFont::from_value("f", &json!({"CPAL": []})).unwrap_err();
        assert!(matches!(err, FontError::MissingTable("COLR")));
        let err = JsonFont::from_value("f", &json!({"COLR": {}})).unwrap_err();
        assert!(matches!(err, FontError::MissingTable("CPAL")));
        let err = JsonFont::from_value("f", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, FontError::InvalidDescription(_)));
    }

    #[test]
    fn test_root_paint_becomes_synthetic_layer() {
        let desc = json!({
            "glyphs": {"a": "M0 0 L1 0 L1 1 Z"},
            "BaseGlyphList": [{"BaseGlyph": "a", "Paint": {"Glyph": "a", "Paint": {"PaletteIndex": 0}}}],
            "palettes": [[[0, 0, 0, 255]]]
        });
        let font = JsonFont::from_value("f", &desc).unwrap();
        let tables = font.color_tables();
        assert_eq!(tables.layers.len(), 1);
        assert_eq!(tables.base_glyph("a").unwrap().layer_range(1), Some(0..1));
        let PaintNode::Composite { children } = &tables.layers[0] else { panic!("expected composite") };
        assert_eq!(children[0], PaintNode::Glyph { glyph: GlyphRef::Name("a".into()), paint: None });
        assert_eq!(children[1], PaintNode::Solid { color: ColorRef::Palette { index: 0, alpha: 1.0 } });
    }

    #[test]
    fn test_unreadable_range_is_kept_as_none() {
        let desc = json!({
            "COLR": {"BaseGlyphRecords": [{"BaseGlyph": "a", "NumLayers": 1}]},
            "CPAL": [[]]
        });
        let font = JsonFont::from_value("f", &desc).unwrap();
        let record = font.color_tables().base_glyph("a").unwrap();
        assert_eq!(record.first_layer_index, None);
        assert_eq!(record.layer_range(0), None);
    }

    #[test]
    fn test_parse_codepoint_forms() {
        assert_eq!(parse_codepoint("U+1F600"), Some(0x1F600));
        assert_eq!(parse_codepoint("0x41"), Some(0x41));
        assert_eq!(parse_codepoint("65"), Some(65));
        assert_eq!(parse_codepoint("é"), Some(0xE9));
        assert_eq!(parse_codepoint("ab"), None);
    }

    #[test]
    fn test_single_digit_key_is_the_character() {
        assert_eq!(parse_codepoint("1"), Some('1' as u32));
        assert_eq!(parse_codepoint("#"), Some('#' as u32));
        assert_eq!(parse_codepoint(" "), Some(0x20));

        let desc = json!({
            "glyphs": {"one": "M0 0 L1 0 L1 1 Z"},
            "cmap": {"1": "one"},
            "COLR": {"BaseGlyphRecords": [{"BaseGlyph": "one", "FirstLayerIndex": 0, "NumLayers": 1}],
                     "LayerRecords": [{"LayerGlyph": "one", "PaletteIndex": 0}]},
            "CPAL": [[[0, 0, 0, 255]]]
        });
        let font = JsonFont::from_value("f", &desc).unwrap();
        assert_eq!(font.glyph_for_char('1'), Some("one".to_string()));
        assert_eq!(font.glyph_for_char('\u{1}'), None);
    }

    #[test]
    fn test_cyclic_and_oversized_layer_references_load() {
        let desc = json!({
            "glyphs": {"a": "M0 0 L1 0 L1 1 Z"},
            "COLR": {
                "BaseGlyphRecords": [{"BaseGlyph": "a", "FirstLayerIndex": 0, "NumLayers": 3}],
                "LayerRecords": [
                    {"LayerGlyph": "a", "PaletteIndex": 0, "FirstLayerIndex": 0, "NumLayers": 3},
                    {"LayerGlyph": "a", "PaletteIndex": 0, "FirstLayerIndex": 0, "NumLayers": 3},
                    {"LayerGlyph": "a", "PaletteIndex": 0, "FirstLayerIndex": 1, "NumLayers": 9e18}
                ]
            },
            "CPAL": [[[0, 0, 0, 255]]]
        });
        let font = JsonFont::from_value("f", &desc).unwrap();
        let tables = font.color_tables();
        assert_eq!(tables.layers.len(), 3);
        assert_eq!(tables.base_glyph("a").unwrap().layer_range(3), Some(0..3));
    }
}
