//! Binary OpenType color fonts.

use crate::colr::decode_color_tables;
use crate::outline::PathSink;
use colrsplit_traits::{FontError, FontSource, OutlineError, SharedFontData};
use colrsplit_types::{ColorTables, FontMetrics, GlyphOrder};
use kurbo::{Affine, BezPath};
use skrifa::FontRef;
use skrifa::raw::{ReadError, TableProvider};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A TrueType/OpenType font with COLR and CPAL tables.
///
/// Color tables, the glyph order and both directions of the character map
/// are decoded up front. Only outlines are read lazily from the shared font
/// bytes.
pub struct OpenTypeFont {
    name: String,
    data: SharedFontData,
    face_index: u32,
    tables: ColorTables,
    order: GlyphOrder,
    cmap: HashMap<u32, u16>,
    lowest_codepoint: HashMap<u16, u32>,
    metrics: FontMetrics,
}

impl fmt::Debug for OpenTypeFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenTypeFont")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .field("glyphs", &self.order.len())
            .field("base_glyphs", &self.tables.base_glyphs.len())
            .finish()
    }
}

impl OpenTypeFont {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| FontError::LoadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::from_bytes(name, Arc::new(data))
    }

    /// Parses the first face in `data`.
    pub fn from_bytes(name: impl Into<String>, data: SharedFontData) -> Result<Self, FontError> {
        let name = name.into();
        let face_index = 0;
        let face = ttf_parser::Face::parse(&data, face_index).map_err(|e| FontError::ParseError(e.to_string()))?;

        let order = GlyphOrder::new(
            (0..face.number_of_glyphs())
                .map(|id| {
                    face.glyph_name(ttf_parser::GlyphId(id))
                        .map_or_else(|| format!("gid{}", id), str::to_owned)
                })
                .collect(),
        );
        let (cmap, lowest_codepoint) = read_cmap(&face);
        let metrics = FontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
        };

        let font = FontRef::new(&data).map_err(|e| FontError::ParseError(e.to_string()))?;
        let colr = font.colr().map_err(|e| table_error("COLR", e))?;
        let cpal = font.cpal().map_err(|e| table_error("CPAL", e))?;
        let tables = decode_color_tables(&colr, &cpal, &order).map_err(|e| FontError::ParseError(e.to_string()))?;

        log::info!(
            "[FONT] loaded '{}': {} glyphs, {} color base glyphs, {} layers, {} palettes",
            name,
            order.len(),
            tables.base_glyphs.len(),
            tables.layers.len(),
            tables.palettes.len()
        );

        Ok(Self {
            name,
            data,
            face_index,
            tables,
            order,
            cmap,
            lowest_codepoint,
            metrics,
        })
    }
}

fn table_error(tag: &'static str, err: ReadError) -> FontError {
    match err {
        ReadError::TableIsMissing(_) => FontError::MissingTable(tag),
        other => FontError::ParseError(format!("{}: {}", tag, other)),
    }
}

/// Forward map from every Unicode subtable, plus each glyph's lowest codepoint.
fn read_cmap(face: &ttf_parser::Face<'_>) -> (HashMap<u32, u16>, HashMap<u16, u32>) {
    let mut forward = HashMap::new();
    let mut lowest: HashMap<u16, u32> = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return (forward, lowest);
    };
    for subtable in cmap.subtables {
        if !subtable.is_unicode() {
            continue;
        }
        subtable.codepoints(|cp| {
            if let Some(gid) = subtable.glyph_index(cp) {
                forward.entry(cp).or_insert(gid.0);
                lowest
                    .entry(gid.0)
                    .and_modify(|existing| *existing = (*existing).min(cp))
                    .or_insert(cp);
            }
        });
    }
    (forward, lowest)
}

impl FontSource for OpenTypeFont {
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
        let gid = *self.cmap.get(&(c as u32))?;
        self.order.name(gid as u32).map(str::to_owned)
    }

    fn codepoint_for_glyph(&self, glyph_name: &str) -> Option<u32> {
        let gid = u16::try_from(self.order.id(glyph_name)?).ok()?;
        self.lowest_codepoint.get(&gid).copied()
    }

    fn outline(&self, glyph_name: &str, transform: Affine) -> Result<BezPath, OutlineError> {
        let gid = self
            .order
            .id(glyph_name)
            .and_then(|id| u16::try_from(id).ok())
            .ok_or_else(|| OutlineError::UnknownGlyph(glyph_name.to_string()))?;
        let face = ttf_parser::Face::parse(&self.data, self.face_index).map_err(|e| OutlineError::Malformed {
            glyph: glyph_name.to_string(),
            message: e.to_string(),
        })?;
        let mut sink = PathSink::new(transform);
        face.outline_glyph(ttf_parser::GlyphId(gid), &mut sink)
            .ok_or_else(|| OutlineError::Malformed {
                glyph: glyph_name.to_string(),
                message: "no outline data".to_string(),
            })?;
        Ok(sink.finish())
    }

    fn metrics(&self) -> FontMetrics {
        self.metrics
    }
}
