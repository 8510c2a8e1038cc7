#![allow(dead_code)]

pub mod fixtures;

use colrsplit::{BatchBuilder, BatchSummary, ExportConfig, JsonFont, PipelineError};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Runs a sequential batch over a JSON font description, writing under `out`.
pub fn export_with(
    description: &Value,
    out: &Path,
    emojis: Option<Vec<String>>,
    configure: impl FnOnce(ExportConfig) -> ExportConfig,
) -> Result<BatchSummary, PipelineError> {
    let font = JsonFont::from_value("fixture", description)?;
    let config = configure(ExportConfig { output_root: out.to_path_buf(), jobs: 1, ..Default::default() });
    BatchBuilder::new()
        .with_font(Arc::new(font))
        .with_config(config)
        .build()?
        .run(emojis)
}

pub fn export(description: &Value, out: &Path, emojis: &[&str]) -> Result<BatchSummary, PipelineError> {
    let emojis = emojis.iter().map(|e| e.to_string()).collect();
    export_with(description, out, Some(emojis), |c| c)
}

/// Parsed `emoji_layers_metadata.json` of one glyph directory.
pub fn read_metadata(out: &Path, dir: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(out.join(dir).join("emoji_layers_metadata.json"))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn read_summary(out: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(out.join("batch_summary.json"))?;
    Ok(serde_json::from_str(&text)?)
}

/// Kinds of every diagnostic in a metadata or summary entry.
pub fn diagnostic_kinds(entry: &Value) -> Vec<String> {
    entry["diagnostics"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|d| d["kind"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
