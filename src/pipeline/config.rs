use crate::error::PipelineError;
use colrsplit_types::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one export run.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Root directory; each glyph gets a `U+XXXX` subdirectory.
    pub output_root: PathBuf,
    /// Palette to resolve colors from. Falls back to palette 0 when absent.
    pub palette_index: usize,
    /// Pixel width and height of every SVG.
    pub svg_size: u32,
    /// Minimum digits in `emoji_layer_NN.svg`.
    pub pad_digits: usize,
    /// Drop outlines whose arc length (font units) is below this.
    pub min_path_length: Option<f64>,
    /// Color used for the reserved foreground palette index.
    pub foreground: Rgba,
    /// Write each glyph's decoded paint trees to `paint_dump.json`.
    pub dump_paints: bool,
    /// Worker threads. `0` uses every core, `1` runs sequentially.
    pub jobs: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("emoji_export"),
            palette_index: 0,
            svg_size: 256,
            pad_digits: 2,
            min_path_length: None,
            foreground: Rgba::BLACK,
            dump_paints: false,
            jobs: 0,
        }
    }
}

impl ExportConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        let config: ExportConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.svg_size == 0 {
            return Err(PipelineError::Config("svg_size must be positive".to_string()));
        }
        if let Some(min) = self.min_path_length {
            if !min.is_finite() || min < 0.0 {
                return Err(PipelineError::Config(format!("min_path_length must be a non-negative number, got {}", min)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ExportConfig =
            serde_json::from_str(r##"{"svg_size": 512, "foreground": "#ffffff", "min_path_length": 0.5}"##).unwrap();
        assert_eq!(config.svg_size, 512);
        assert_eq!(config.foreground, Rgba::opaque(255, 255, 255));
        assert_eq!(config.min_path_length, Some(0.5));
        assert_eq!(config.pad_digits, 2);
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let config = ExportConfig { svg_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"palette_index": 2, "jobs": 1}"#).unwrap();
        let config = ExportConfig::from_json_file(&path).unwrap();
        assert_eq!(config.palette_index, 2);
        assert_eq!(config.jobs, 1);
    }
}
