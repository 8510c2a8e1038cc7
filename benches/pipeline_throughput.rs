//! Glyph export throughput benchmarks
//!
//! Measures extraction and the full batch over a synthetic color font with:
//! - Layer counts per glyph (4, 16, 64)
//! - Worker configurations (1, 2, 4, 8)
//!
//! Run benchmarks: `cargo bench --bench pipeline_throughput`
//!
//! Compare specific groups:
//! ```
//! cargo bench --bench pipeline_throughput -- "extraction"
//! cargo bench --bench pipeline_throughput -- "worker_scaling"
//! ```

use colrsplit::{BatchBuilder, Diagnostics, ExportConfig, GlyphProcessor, JsonFont};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::sync::Arc;

const FIRST_CODEPOINT: u32 = 0xE000;

/// A font with `glyphs` base glyphs of `layers` layers each. Every third
/// layer repeats an earlier outline so deduplication has work to do.
fn synthetic_font(glyphs: usize, layers: usize) -> Value {
    let mut outlines = serde_json::Map::new();
    let mut cmap = serde_json::Map::new();
    let mut records = Vec::new();
    let mut layer_records = Vec::new();

    for g in 0..glyphs {
        let base = format!("base{}", g);
        outlines.insert(base.clone(), json!("M0 0 L10 0 L10 10 Z"));
        cmap.insert(format!("U+{:04X}", FIRST_CODEPOINT + g as u32), json!(base));
        records.push(json!({"BaseGlyph": base, "FirstLayerIndex": layer_records.len(), "NumLayers": layers}));

        for l in 0..layers {
            let shape = if l % 3 == 2 { l - 1 } else { l };
            let name = format!("g{}_l{}", g, shape);
            let size = 20 + shape * 7;
            outlines.insert(
                name.clone(),
                json!(format!("M{0} 0 C{1} 40 {2} 80 {0} {3} L0 {3} Z", shape, size, size / 2, size * 2)),
            );
            layer_records.push(json!({"LayerGlyph": name, "PaletteIndex": l % 4}));
        }
    }

    json!({
        "glyphs": outlines,
        "cmap": cmap,
        "COLR": {"BaseGlyphRecords": records, "LayerRecords": layer_records},
        "CPAL": {"palettes": [[[0, 0, 255, 255], [0, 255, 0, 255], [255, 0, 0, 255], [0, 0, 0, 255]]]}
    })
}

fn emoji(index: usize) -> String {
    char::from_u32(FIRST_CODEPOINT + index as u32).map(String::from).unwrap_or_default()
}

/// In-memory extraction, grouping and dedupe of one glyph.
fn benchmark_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    let config = ExportConfig::default();

    for layers in [4, 16, 64] {
        let font = JsonFont::from_value("bench", &synthetic_font(1, layers)).expect("Failed to load synthetic font");
        let processor = GlyphProcessor::new(&font, &config);
        let target = emoji(0);
        group.throughput(Throughput::Elements(layers as u64));
        group.bench_with_input(BenchmarkId::new("layers", layers), &layers, |b, _| {
            b.iter(|| {
                let mut diagnostics = Diagnostics::new();
                processor.extract(&target, &mut diagnostics).expect("Extraction failed")
            });
        });
    }
    group.finish();
}

/// Full batch including file output, with varying worker counts.
fn benchmark_worker_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker_scaling");
    group.sample_size(10);
    let glyphs = 64;
    let font = Arc::new(JsonFont::from_value("bench", &synthetic_font(glyphs, 16)).expect("Failed to load synthetic font"));
    let emojis: Vec<String> = (0..glyphs).map(emoji).collect();
    group.throughput(Throughput::Elements(glyphs as u64));

    for jobs in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("jobs", jobs), &jobs, |b, &jobs| {
            b.iter(|| {
                let dir = tempfile::tempdir().expect("Failed to create temp dir");
                let runner = BatchBuilder::new()
                    .with_font(font.clone())
                    .with_config(ExportConfig { output_root: dir.path().to_path_buf(), ..Default::default() })
                    .with_jobs(jobs)
                    .build()
                    .expect("Failed to build batch");
                runner.run(Some(emojis.clone())).expect("Batch failed")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_extraction, benchmark_worker_scaling);
criterion_main!(benches);
