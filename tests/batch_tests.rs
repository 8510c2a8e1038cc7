mod common;

use colrsplit::{BatchBuilder, ExportConfig, InterruptFlag, JsonFont};
use common::fixtures::{self, HEART, SMILE};
use common::{TestResult, diagnostic_kinds, export, export_with, read_summary};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_missing_glyph_is_counted_as_failure() -> TestResult {
    let dir = tempfile::tempdir()?;
    let summary = export(&fixtures::duplicate_triangle_font(), dir.path(), &["\u{1F9FF}"])?;
    assert_eq!(summary.processed_count, 1);
    assert_eq!(summary.success_count, 0);
    assert_eq!(summary.failed_count, 1);
    assert_eq!(summary.glyphs[0].reason.as_deref(), Some("glyph_not_found"));

    let written = read_summary(dir.path())?;
    assert_eq!(written["processed_count"], json!(1));
    assert_eq!(written["interrupted"], json!(false));
    assert!(diagnostic_kinds(&written["glyphs"][0]).contains(&"glyph_not_found".to_string()));
    assert!(!dir.path().join("U+1F9FF").exists());
    Ok(())
}

#[test]
fn test_glyph_failure_does_not_stop_the_batch() -> TestResult {
    let dir = tempfile::tempdir()?;
    let summary = export(&fixtures::duplicate_triangle_font(), dir.path(), &[HEART, SMILE, "x"])?;
    assert_eq!(summary.processed_count, 3);
    assert_eq!(summary.success_count, 1);
    let reasons: Vec<Option<&str>> = summary.glyphs.iter().map(|g| g.reason.as_deref()).collect();
    assert_eq!(reasons, vec![Some("empty_layer_range"), None, Some("glyph_not_found")]);
    assert_eq!(summary.glyphs[1].exported, 1);
    Ok(())
}

#[test]
fn test_candidates_come_from_color_table() -> TestResult {
    let dir = tempfile::tempdir()?;
    let summary = export_with(&fixtures::duplicate_triangle_font(), dir.path(), None, |c| c)?;
    let emojis: Vec<&str> = summary.glyphs.iter().map(|g| g.emoji.as_str()).collect();
    // smile maps from two codepoints; the lowest one is listed once
    assert_eq!(emojis, vec![SMILE, HEART]);

    let list = std::fs::read_to_string(dir.path().join("emoji_list.txt"))?;
    assert_eq!(list, format!("{}\n{}\n", SMILE, HEART));
    Ok(())
}

#[test]
fn test_sequence_directory_joins_codepoints() -> TestResult {
    let dir = tempfile::tempdir()?;
    let sequence = "\u{1F600}\u{200D}\u{1F525}";
    let summary = export(&fixtures::duplicate_triangle_font(), dir.path(), &[sequence])?;
    assert_eq!(summary.success_count, 1);
    assert!(dir.path().join("U+1F600-U+200D-U+1F525").join("emoji_layers_metadata.json").exists());
    Ok(())
}

#[test]
fn test_interrupt_skips_remaining_glyphs_and_writes_summary() -> TestResult {
    let dir = tempfile::tempdir()?;
    let font = JsonFont::from_value("fixture", &fixtures::duplicate_triangle_font())?;
    let interrupt = InterruptFlag::new();
    interrupt.raise();
    let runner = BatchBuilder::new()
        .with_font(Arc::new(font))
        .with_config(ExportConfig { output_root: dir.path().to_path_buf(), ..Default::default() })
        .with_jobs(1)
        .with_interrupt(interrupt)
        .build()?;

    let summary = runner.run(Some(vec![SMILE.to_string(), HEART.to_string()]))?;
    assert!(summary.interrupted);
    assert_eq!(summary.processed_count, 0);

    let written = read_summary(dir.path())?;
    assert_eq!(written["interrupted"], json!(true));
    assert!(written["started_at"].is_string());
    assert!(written["finished_at"].is_string());
    Ok(())
}

#[cfg(feature = "rayon-executor")]
#[test]
fn test_parallel_run_matches_sequential() -> TestResult {
    let seq_dir = tempfile::tempdir()?;
    let par_dir = tempfile::tempdir()?;
    let emojis = vec![SMILE.to_string(), HEART.to_string(), "x".to_string()];
    let font = fixtures::gradient_font();

    let sequential = export_with(&font, seq_dir.path(), Some(emojis.clone()), |c| c)?;
    let parallel = export_with(&font, par_dir.path(), Some(emojis), |c| ExportConfig { jobs: 4, ..c })?;

    assert_eq!(sequential.processed_count, parallel.processed_count);
    let strip = |s: &colrsplit::BatchSummary| {
        s.glyphs.iter().map(|g| (g.emoji.clone(), g.success, g.exported, g.diagnostics.clone())).collect::<Vec<_>>()
    };
    assert_eq!(strip(&sequential), strip(&parallel));

    let a = std::fs::read(seq_dir.path().join("U+1F600").join("emoji_layer_01.svg"))?;
    let b = std::fs::read(par_dir.path().join("U+1F600").join("emoji_layer_01.svg"))?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn test_font_without_palette_table_is_fatal() {
    let result = JsonFont::from_value("broken", &json!({"COLR": {"BaseGlyphRecords": []}}));
    assert!(result.is_err());
}

#[test]
fn test_unwritable_emoji_list_still_writes_summary() -> TestResult {
    let dir = tempfile::tempdir()?;
    // a directory where the list file should go makes the list write fail
    std::fs::create_dir_all(dir.path().join("emoji_list.txt").join("blocker"))?;

    let summary = export_with(&fixtures::duplicate_triangle_font(), dir.path(), None, |c| c)?;
    assert_eq!(summary.processed_count, 2);
    assert_eq!(summary.success_count, 1);
    assert!(dir.path().join("emoji_list.txt").is_dir());

    let written = read_summary(dir.path())?;
    assert_eq!(written["processed_count"], json!(2));
    Ok(())
}
