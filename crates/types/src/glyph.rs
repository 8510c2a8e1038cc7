use crate::color::RawColor;
use crate::paint::PaintNode;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

/// Maps a base glyph to a run of entries in the flat layer list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseGlyphRecord {
    pub glyph_name: String,
    pub glyph_id: u32,
    /// `None` when the source could not read the field.
    pub first_layer_index: Option<usize>,
    pub num_layers: Option<usize>,
    /// The record's own paint, when it carries fill information beyond the
    /// layer range. Used as a color fallback for layers without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paint: Option<PaintNode>,
}

impl BaseGlyphRecord {
    pub fn new(glyph_name: impl Into<String>, glyph_id: u32, first_layer_index: usize, num_layers: usize) -> Self {
        Self {
            glyph_name: glyph_name.into(),
            glyph_id,
            first_layer_index: Some(first_layer_index),
            num_layers: Some(num_layers),
            paint: None,
        }
    }

    /// The record's layer range clamped to a layer list of `total` entries.
    ///
    /// Always satisfies `start <= end <= total`, whatever the record claims.
    /// `None` when either bound is unreadable.
    pub fn layer_range(&self, total: usize) -> Option<Range<usize>> {
        let start = self.first_layer_index?.min(total);
        let end = start + self.num_layers?.min(total - start);
        Some(start..end)
    }
}

/// Glyph id to name mapping, with the reverse index.
#[derive(Debug, Clone, Default)]
pub struct GlyphOrder {
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl GlyphOrder {
    pub fn new(names: Vec<String>) -> Self {
        let mut ids = HashMap::with_capacity(names.len());
        for (id, name) in names.iter().enumerate() {
            // First occurrence wins for duplicated names.
            ids.entry(name.clone()).or_insert(id as u32);
        }
        Self { names, ids }
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn id(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One color palette: raw entries in font order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Palette {
    pub entries: Vec<RawColor>,
}

impl Palette {
    pub fn new(entries: Vec<RawColor>) -> Self {
        Self { entries }
    }

    pub fn get(&self, index: u16) -> Option<&RawColor> {
        self.entries.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The decoded color-layer and palette tables of a font.
#[derive(Debug, Clone, Default)]
pub struct ColorTables {
    pub base_glyphs: Vec<BaseGlyphRecord>,
    pub layers: Vec<PaintNode>,
    pub palettes: Vec<Palette>,
    by_name: HashMap<String, usize>,
}

impl ColorTables {
    pub fn new(base_glyphs: Vec<BaseGlyphRecord>, layers: Vec<PaintNode>, palettes: Vec<Palette>) -> Self {
        let mut by_name = HashMap::with_capacity(base_glyphs.len());
        for (i, record) in base_glyphs.iter().enumerate() {
            by_name.entry(record.glyph_name.clone()).or_insert(i);
        }
        Self { base_glyphs, layers, palettes, by_name }
    }

    pub fn base_glyph(&self, glyph_name: &str) -> Option<&BaseGlyphRecord> {
        self.by_name.get(glyph_name).and_then(|&i| self.base_glyphs.get(i))
    }

    pub fn palette(&self, index: usize) -> Option<&Palette> {
        self.palettes.get(index)
    }

    pub fn layer(&self, index: usize) -> Option<&PaintNode> {
        self.layers.get(index)
    }
}

/// Vertical metrics used to size SVG output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self { units_per_em: 1000, ascender: 800, descender: -200 }
    }
}
