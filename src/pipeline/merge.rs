//! Fill grouping and in-group deduplication.
//!
//! Groups keep first-seen order: output layer numbers are derived from it,
//! and downstream consumers refer to layers by those numbers.

use colrsplit_path::fingerprint;
use colrsplit_types::{Diagnostic, DiagnosticKind, Diagnostics, Fill, GradientSpec};
use indexmap::IndexMap;
use kurbo::Affine;

const GRADIENT_KEY_PREFIX: &str = "GRADIENT_";
const GRADIENT_HASH_LEN: usize = 12;

/// One outline reference of one layer, already in device space and closed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSubpath {
    pub global_layer_index: usize,
    pub local_layer_index: usize,
    pub glyph_name: String,
    pub path_data: String,
    pub transform: Affine,
    /// Arc length of the outline, used by the minimum-length filter.
    pub length: f64,
    /// Every source layer that produced this exact path, in first-seen order.
    pub source_layers: Vec<usize>,
}

impl ExtractedSubpath {
    pub fn new(
        global_layer_index: usize,
        local_layer_index: usize,
        glyph_name: impl Into<String>,
        path_data: impl Into<String>,
        transform: Affine,
    ) -> Self {
        Self {
            global_layer_index,
            local_layer_index,
            glyph_name: glyph_name.into(),
            path_data: path_data.into(),
            transform,
            length: f64::INFINITY,
            source_layers: vec![global_layer_index],
        }
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillGroup {
    pub key: String,
    pub fill: Fill,
    pub subpaths: Vec<ExtractedSubpath>,
}

impl FillGroup {
    /// Union of contributing source layers over all kept subpaths.
    pub fn merged_layer_indices(&self) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for layer in self.subpaths.iter().flat_map(|s| s.source_layers.iter().copied()) {
            if !out.contains(&layer) {
                out.push(layer);
            }
        }
        out
    }

    pub fn glyph_names(&self) -> Vec<String> {
        self.subpaths.iter().map(|s| s.glyph_name.clone()).collect()
    }
}

/// Hex string for solid fills, `GRADIENT_` plus a content hash for gradients.
///
/// Equal fills always produce equal keys.
pub fn fill_key(fill: &Fill) -> String {
    match fill {
        Fill::Solid { color } => color.to_hex(),
        Fill::Gradient(spec) => format!("{}{}", GRADIENT_KEY_PREFIX, gradient_hash(spec)),
    }
}

/// Short content hash of a gradient, also used for its SVG element id.
pub fn gradient_hash(spec: &GradientSpec) -> String {
    // plain value type, serialization does not fail
    let canonical = serde_json::to_string(spec).unwrap_or_default();
    let hex = blake3::hash(canonical.as_bytes()).to_hex();
    hex[..GRADIENT_HASH_LEN].to_string()
}

/// Buckets subpaths by fill, preserving first-seen order of fill keys and
/// input order within each bucket.
pub fn group(subpaths: impl IntoIterator<Item = (Fill, ExtractedSubpath)>) -> Vec<FillGroup> {
    let mut groups: IndexMap<String, FillGroup> = IndexMap::new();
    for (fill, subpath) in subpaths {
        let key = fill_key(&fill);
        groups
            .entry(key)
            .or_insert_with_key(|key| FillGroup { key: key.clone(), fill, subpaths: Vec::new() })
            .subpaths
            .push(subpath);
    }
    groups.into_values().collect()
}

/// Drops subpaths shorter than `min_length`, then collapses paths with equal
/// normalized content.
///
/// The first occurrence is kept; the source layers of collapsed copies are
/// appended to its `source_layers`.
pub fn dedupe(mut group: FillGroup, min_length: Option<f64>, diagnostics: &mut Diagnostics) -> FillGroup {
    if let Some(min) = min_length {
        group.subpaths.retain(|s| {
            let keep = s.length >= min;
            if !keep {
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::PathTooShort)
                        .at_layer(s.global_layer_index)
                        .for_glyph(s.glyph_name.as_str())
                        .in_group(group.key.as_str())
                        .with_detail(format!("length {:.3} < {}", s.length, min)),
                );
            }
            keep
        });
    }

    let mut seen: IndexMap<String, usize> = IndexMap::new();
    let mut kept: Vec<ExtractedSubpath> = Vec::with_capacity(group.subpaths.len());
    for subpath in group.subpaths {
        let hash = fingerprint(&subpath.path_data);
        match seen.get(&hash) {
            Some(&slot) => {
                let first = &mut kept[slot];
                diagnostics.push(
                    Diagnostic::new(DiagnosticKind::DuplicatePathCollapsed)
                        .at_layer(subpath.global_layer_index)
                        .for_glyph(subpath.glyph_name.as_str())
                        .in_group(group.key.as_str())
                        .with_detail(format!("same path as layer {}", first.global_layer_index)),
                );
                for layer in subpath.source_layers {
                    if !first.source_layers.contains(&layer) {
                        first.source_layers.push(layer);
                    }
                }
            }
            None => {
                seen.insert(hash, kept.len());
                kept.push(subpath);
            }
        }
    }
    group.subpaths = kept;
    group
}

/// Dedupes every group and drops the ones left empty.
pub fn merge(groups: Vec<FillGroup>, min_length: Option<f64>, diagnostics: &mut Diagnostics) -> Vec<FillGroup> {
    groups
        .into_iter()
        .filter_map(|group| {
            let group = dedupe(group, min_length, diagnostics);
            if group.subpaths.is_empty() {
                log::warn!("[MERGE] dropping fill group {} with no remaining paths", group.key);
                diagnostics.push(Diagnostic::new(DiagnosticKind::EmptyGroupDropped).in_group(group.key));
                None
            } else {
                Some(group)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colrsplit_types::{ColorStop, Extend, GradientAnchors, GradientKind, Rgba};

    fn red() -> Fill {
        Fill::Solid { color: Rgba::opaque(255, 0, 0) }
    }

    fn blue() -> Fill {
        Fill::Solid { color: Rgba::opaque(0, 0, 255) }
    }

    fn sub(layer: usize, d: &str) -> ExtractedSubpath {
        ExtractedSubpath::new(layer, layer, format!("g{}", layer), d, Affine::IDENTITY)
    }

    fn linear(offset: f64) -> Fill {
        Fill::Gradient(GradientSpec {
            kind: GradientKind::Linear,
            anchors: GradientAnchors::Linear { x0: 0.0, y0: 0.0, x1: 1.0, y1: 0.0 },
            stops: vec![ColorStop { offset, color: Rgba::BLACK }],
            extend: Extend::Pad,
            transform: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        })
    }

    #[test]
    fn test_group_preserves_first_seen_order() {
        let input = vec![(blue(), sub(0, "M0 0 L1 0 Z")), (red(), sub(1, "M0 0 L2 0 Z")), (blue(), sub(2, "M0 0 L3 0 Z"))];
        let groups = group(input.clone());
        assert_eq!(groups.iter().map(|g| g.key.as_str()).collect::<Vec<_>>(), vec!["#0000ff", "#ff0000"]);
        assert_eq!(groups[0].subpaths.len(), 2);
        // deterministic across runs
        assert_eq!(group(input), groups);
    }

    #[test]
    fn test_dedupe_ignores_whitespace_and_case() {
        let g = group(vec![(red(), sub(0, "M0 0 L1 1 Z")), (red(), sub(1, "M0 0L1 1Z"))]).remove(0);
        let mut diags = Diagnostics::new();
        let g = dedupe(g, None, &mut diags);
        assert_eq!(g.subpaths.len(), 1);
        assert_eq!(g.subpaths[0].glyph_name, "g0");
        assert_eq!(g.merged_layer_indices(), vec![0, 1]);
        assert_eq!(diags.count(DiagnosticKind::DuplicatePathCollapsed), 1);
    }

    #[test]
    fn test_gradient_keys_follow_structural_equality() {
        assert_eq!(fill_key(&linear(0.0)), fill_key(&linear(0.0)));
        assert_ne!(fill_key(&linear(0.0)), fill_key(&linear(0.5)));
        assert!(fill_key(&linear(0.0)).starts_with("GRADIENT_"));
        assert_eq!(fill_key(&linear(0.0)).len(), "GRADIENT_".len() + 12);
    }

    #[test]
    fn test_short_paths_empty_a_group_which_is_dropped() {
        let groups = group(vec![
            (red(), sub(0, "M0 0 L1 0 Z").with_length(0.2)),
            (blue(), sub(1, "M0 0 L9 0 Z").with_length(18.0)),
        ]);
        let mut diags = Diagnostics::new();
        let merged = merge(groups, Some(0.5), &mut diags);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].key, "#0000ff");
        assert_eq!(diags.count(DiagnosticKind::PathTooShort), 1);
        assert_eq!(diags.count(DiagnosticKind::EmptyGroupDropped), 1);
    }
}
