//! Per-glyph extraction and export.
//!
//! One call handles one requested emoji, strictly in sequence: resolve the
//! base glyph and its layer range, walk every layer, pull and sanitize the
//! outlines, group and dedupe by fill, then write the SVG layers and the
//! metadata document.

use super::config::ExportConfig;
use super::merge::{self, ExtractedSubpath, FillGroup};
use crate::error::ProcessError;
use colrsplit_export::naming::{METADATA_FILE, PAINT_DUMP_FILE};
use colrsplit_export::{
    ExportedLayer, GlyphManifest, GradientMeta, OriginalLayer, SvgCanvas, SvgLayer, codepoint_dir_name,
    codepoint_labels, layer_file_name, render_layer, write_atomic, write_json,
};
use colrsplit_paint::{PaletteResolver, normalize, walk_layer};
use colrsplit_path::{OutlineExtractor, path_length, sanitize, to_svg_d};
use colrsplit_traits::FontSource;
use colrsplit_types::{
    BaseGlyphRecord, ColorRef, Diagnostic, DiagnosticKind, Diagnostics, Fill, GradientKind, PaintNode, Palette, Rgba,
};
use kurbo::Affine;
use serde::Serialize;
use std::path::PathBuf;

/// Everything extracted from one glyph before anything is written.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub glyph_name: String,
    pub groups: Vec<FillGroup>,
    pub original_layers: Vec<OriginalLayer>,
}

/// A glyph that was written successfully.
#[derive(Debug, Clone)]
pub struct GlyphOutput {
    pub out_dir: PathBuf,
    pub manifest: GlyphManifest,
}

#[derive(Serialize)]
struct LayerDump<'a> {
    layer_index: usize,
    paint: &'a PaintNode,
}

#[derive(Serialize)]
struct PaintDump<'a> {
    glyph_name: &'a str,
    record: &'a BaseGlyphRecord,
    layers: Vec<LayerDump<'a>>,
}

pub struct GlyphProcessor<'a> {
    font: &'a dyn FontSource,
    config: &'a ExportConfig,
}

impl<'a> GlyphProcessor<'a> {
    pub fn new(font: &'a dyn FontSource, config: &'a ExportConfig) -> Self {
        Self { font, config }
    }

    /// Glyph for the first character of `emoji` that the character map knows.
    pub fn resolve_glyph(&self, emoji: &str) -> Result<String, ProcessError> {
        emoji
            .chars()
            .find_map(|c| self.font.glyph_for_char(c))
            .ok_or_else(|| ProcessError::GlyphNotFound(emoji.to_string()))
    }

    /// The configured palette, or palette 0 with a diagnostic when it does not exist.
    pub fn select_palette(&self, diagnostics: &mut Diagnostics) -> Option<&'a Palette> {
        let tables = self.font.color_tables();
        if let Some(palette) = tables.palette(self.config.palette_index) {
            return Some(palette);
        }
        let fallback = tables.palette(0)?;
        log::warn!(
            "[PALETTE] palette {} not found ({} available), using palette 0",
            self.config.palette_index,
            tables.palettes.len()
        );
        diagnostics.push(
            Diagnostic::new(DiagnosticKind::PaletteFallback)
                .with_detail(format!("palette {} not found", self.config.palette_index)),
        );
        Some(fallback)
    }

    /// Runs every stage up to, but not including, writing files.
    pub fn extract(&self, emoji: &str, diagnostics: &mut Diagnostics) -> Result<Extraction, ProcessError> {
        let glyph_name = self.resolve_glyph(emoji)?;
        let tables = self.font.color_tables();
        let record = tables
            .base_glyph(&glyph_name)
            .ok_or_else(|| ProcessError::BaseGlyphNotMatched(glyph_name.clone()))?;
        let total = tables.layers.len();
        let range = record
            .layer_range(total)
            .ok_or_else(|| ProcessError::LayerRangeUnreadable(glyph_name.clone()))?;
        if range.is_empty() {
            return Err(ProcessError::EmptyLayerRange {
                glyph: glyph_name,
                first: record.first_layer_index,
                count: record.num_layers,
                total,
            });
        }
        log::debug!("[GLYPH {}] '{}' uses layers {:?}", emoji, glyph_name, range);

        let resolver = PaletteResolver::new(self.select_palette(diagnostics), self.config.foreground);
        let order = self.font.glyph_order();
        let base_color: Option<ColorRef> = record
            .paint
            .as_ref()
            .and_then(|paint| walk_layer(paint, Affine::IDENTITY, order).color);
        let extractor = OutlineExtractor::new(self.font);

        let mut subpaths: Vec<(Fill, ExtractedSubpath)> = Vec::new();
        let mut original_layers = Vec::new();

        for global in range.clone() {
            let local = global - range.start;
            let Some(node) = tables.layer(global) else {
                continue;
            };
            let walk = walk_layer(node, Affine::IDENTITY, order);
            for id in &walk.unresolved {
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::UnresolvedGlyphRef)
                        .at_layer(global)
                        .with_detail(format!("glyph id {} is not in the glyph order", id)),
                );
            }

            let gradient = walk.gradient.as_ref().and_then(|(raw, transform)| {
                let spec = normalize(raw, *transform, &resolver);
                match &spec {
                    None => diagnostics.push(Diagnostic::new(DiagnosticKind::GradientWithoutStops).at_layer(global)),
                    Some(s) if s.kind == GradientKind::Unknown => {
                        diagnostics.push(Diagnostic::new(DiagnosticKind::UnknownGradientKind).at_layer(global))
                    }
                    Some(_) => {}
                }
                spec
            });
            let fill = match gradient {
                Some(spec) => Fill::Gradient(spec),
                None => Fill::Solid {
                    color: self.layer_color(walk.color.as_ref(), base_color.as_ref(), &resolver, global, diagnostics),
                },
            };
            let color = fill.representative_color();

            if walk.glyphs.is_empty() {
                diagnostics.push(Diagnostic::new(DiagnosticKind::NoGlyphExtracted).at_layer(global));
                original_layers.push(OriginalLayer {
                    layer_index_global: global,
                    layer_index_local: local,
                    glyph_name: None,
                    color,
                    hex: color.to_hex(),
                    matrix: walk.transform.as_coeffs(),
                    group_key: None,
                });
                continue;
            }

            let key = merge::fill_key(&fill);
            for hit in &walk.glyphs {
                let outline = extractor.extract(&hit.glyph_name, hit.transform, global, diagnostics);
                let path_data = outline.as_ref().and_then(|outline| sanitize(&to_svg_d(outline)));
                let usable = path_data.is_some();
                if outline.is_some() && !usable {
                    diagnostics.push(
                        Diagnostic::new(DiagnosticKind::InvalidPathSkipped)
                            .at_layer(global)
                            .for_glyph(hit.glyph_name.as_str()),
                    );
                }
                original_layers.push(OriginalLayer {
                    layer_index_global: global,
                    layer_index_local: local,
                    glyph_name: Some(hit.glyph_name.clone()),
                    color,
                    hex: color.to_hex(),
                    matrix: hit.transform.as_coeffs(),
                    group_key: usable.then(|| key.clone()),
                });
                if let (Some(outline), Some(path_data)) = (&outline, path_data) {
                    let subpath = ExtractedSubpath::new(global, local, hit.glyph_name.as_str(), path_data, hit.transform)
                        .with_length(path_length(outline));
                    subpaths.push((fill.clone(), subpath));
                }
            }
        }

        let groups = merge::merge(merge::group(subpaths), self.config.min_path_length, diagnostics);
        if groups.is_empty() {
            return Err(ProcessError::NoFillGroups(glyph_name));
        }
        Ok(Extraction { glyph_name, groups, original_layers })
    }

    /// Solid color for a layer: its own color reference, then the base
    /// glyph's, then the first visible palette entry.
    fn layer_color(
        &self,
        own: Option<&ColorRef>,
        base: Option<&ColorRef>,
        resolver: &PaletteResolver<'_>,
        layer: usize,
        diagnostics: &mut Diagnostics,
    ) -> Rgba {
        match own.or(base) {
            Some(color) => resolver.resolve_color(color, layer, diagnostics),
            None => {
                let index = resolver.first_visible();
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::MissingColorIndex)
                        .at_layer(layer)
                        .with_detail(format!("using first visible palette entry {}", index)),
                );
                resolver.resolve(index, layer, diagnostics)
            }
        }
    }

    /// Extracts and writes one glyph. The metadata document is written last,
    /// after every SVG it references.
    pub fn process(&self, emoji: &str, diagnostics: &mut Diagnostics) -> Result<GlyphOutput, ProcessError> {
        let extraction = self.extract(emoji, diagnostics)?;
        let out_dir = self.config.output_root.join(codepoint_dir_name(emoji));
        let canvas = SvgCanvas { size: self.config.svg_size, metrics: self.font.metrics() };

        if self.config.dump_paints {
            self.write_paint_dump(&extraction.glyph_name, &out_dir)?;
        }

        let mut layers = Vec::with_capacity(extraction.groups.len());
        for (index, group) in extraction.groups.iter().enumerate() {
            let svg_file_name = layer_file_name(index, self.config.pad_digits);
            let gradient_id = match &group.fill {
                Fill::Gradient(spec) => format!("g_{}", merge::gradient_hash(spec)),
                Fill::Solid { .. } => String::new(),
            };
            let svg = render_layer(
                &canvas,
                &SvgLayer {
                    fill: &group.fill,
                    gradient_id: &gradient_id,
                    paths: group.subpaths.iter().map(|s| s.path_data.as_str()).collect(),
                },
            );
            write_atomic(&out_dir.join(&svg_file_name), svg.as_bytes())?;

            let color = group.fill.representative_color();
            let gradient = match &group.fill {
                Fill::Gradient(spec) if spec.kind != GradientKind::Unknown => Some(GradientMeta::new(gradient_id, spec)),
                _ => None,
            };
            log::debug!(
                "[GLYPH {}] wrote {} ({} paths, gradient: {})",
                emoji,
                svg_file_name,
                group.subpaths.len(),
                gradient.is_some()
            );
            layers.push(ExportedLayer {
                index,
                group_key: group.key.clone(),
                merged_layer_indices: group.merged_layer_indices(),
                glyph_names: group.glyph_names(),
                color,
                hex: color.to_hex(),
                svg_file_name,
                subpath_count: group.subpaths.len(),
                gradient,
            });
        }

        let manifest = GlyphManifest {
            emoji_char: emoji.to_string(),
            emoji_codepoints: codepoint_labels(emoji),
            glyph_name: extraction.glyph_name,
            layers,
            original_layers: extraction.original_layers,
            diagnostics: diagnostics.iter().cloned().collect(),
        };
        write_json(&out_dir.join(METADATA_FILE), &manifest)?;
        log::info!("[GLYPH {}] exported {} layers to {}", emoji, manifest.layers.len(), out_dir.display());
        Ok(GlyphOutput { out_dir, manifest })
    }

    fn write_paint_dump(&self, glyph_name: &str, out_dir: &std::path::Path) -> Result<(), ProcessError> {
        let tables = self.font.color_tables();
        let Some(record) = tables.base_glyph(glyph_name) else {
            return Ok(());
        };
        let layers = record
            .layer_range(tables.layers.len())
            .into_iter()
            .flatten()
            .filter_map(|i| tables.layer(i).map(|paint| LayerDump { layer_index: i, paint }))
            .collect();
        let dump = PaintDump { glyph_name, record, layers };
        write_json(&out_dir.join(PAINT_DUMP_FILE), &dump)?;
        Ok(())
    }
}
