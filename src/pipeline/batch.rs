// src/pipeline/batch.rs
use super::config::ExportConfig;
use super::glyph::GlyphProcessor;
use crate::error::PipelineError;
use crate::interrupt::InterruptFlag;
use chrono::Utc;
use colrsplit_executor::ExecutorImpl;
use colrsplit_export::naming::{EMOJI_LIST_FILE, SUMMARY_FILE};
use colrsplit_export::{BatchSummary, GlyphSummary, write_atomic, write_json};
use colrsplit_traits::{Executor, FontSource};
use colrsplit_types::{Diagnostic, Diagnostics};
use indexmap::IndexSet;
use itertools::Itertools;
use std::sync::Arc;
use std::time::Instant;

/// Running totals of a batch.
///
/// Each worker records its glyph into a state of its own; the runner folds
/// them together with [`BatchState::merge`] in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchState {
    pub processed: usize,
    pub succeeded: usize,
    pub glyphs: Vec<GlyphSummary>,
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, glyph: GlyphSummary) {
        self.processed += 1;
        if glyph.success {
            self.succeeded += 1;
        }
        self.glyphs.push(glyph);
    }

    pub fn merge(&mut self, other: BatchState) {
        self.processed += other.processed;
        self.succeeded += other.succeeded;
        self.glyphs.extend(other.glyphs);
    }

    pub fn failed(&self) -> usize {
        self.processed - self.succeeded
    }

    /// Diagnostics across every recorded glyph.
    pub fn diagnostic_count(&self) -> usize {
        self.glyphs.iter().map(|g| g.diagnostics.len()).sum()
    }
}

/// Runs the per-glyph processor over a list of emoji and writes the summary.
pub struct BatchRunner {
    font: Arc<dyn FontSource>,
    config: Arc<ExportConfig>,
    executor: ExecutorImpl,
    interrupt: InterruptFlag,
}

impl BatchRunner {
    pub fn new(
        font: Arc<dyn FontSource>,
        config: ExportConfig,
        executor: ExecutorImpl,
        interrupt: InterruptFlag,
    ) -> Self {
        Self { font, config: Arc::new(config), executor, interrupt }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn interrupt_flag(&self) -> &InterruptFlag {
        &self.interrupt
    }

    /// Every color base glyph that the character map reaches, as the
    /// character of its lowest codepoint, deduplicated in table order.
    pub fn candidates(&self) -> Vec<String> {
        let mut seen: IndexSet<char> = IndexSet::new();
        for record in &self.font.color_tables().base_glyphs {
            match self.font.codepoint_for_glyph(&record.glyph_name).and_then(char::from_u32) {
                Some(c) => {
                    seen.insert(c);
                }
                None => log::debug!("[BATCH] base glyph '{}' has no character mapping", record.glyph_name),
            }
        }
        seen.into_iter().map(String::from).collect()
    }

    /// Processes `emojis`, or every candidate from the color table when
    /// `None`. The summary is written even when the run is interrupted.
    pub fn run(&self, emojis: Option<Vec<String>>) -> Result<BatchSummary, PipelineError> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let emojis = match emojis {
            Some(list) => list,
            None => {
                let list = self.candidates();
                let text = format!("{}\n", list.iter().join("\n"));
                let path = self.config.output_root.join(EMOJI_LIST_FILE);
                // not fatal, the summary is still written
                if let Err(e) = write_atomic(&path, text.as_bytes()) {
                    log::warn!("[BATCH] could not write {}: {}", path.display(), e);
                }
                list
            }
        };

        log::info!(
            "[BATCH] processing {} emoji from '{}' with {} ({} workers)",
            emojis.len(),
            self.font.name(),
            self.executor.name(),
            self.executor.parallelism()
        );

        let font = Arc::clone(&self.font);
        let config = Arc::clone(&self.config);
        let interrupt = self.interrupt.clone();
        let outcomes = self.executor.execute_all(emojis, move |emoji| {
            if interrupt.is_raised() {
                log::debug!("[BATCH] skipping {} after interrupt", emoji);
                return None;
            }
            let mut state = BatchState::new();
            state.record(process_one(font.as_ref(), &config, emoji));
            Some(state)
        });

        let state = outcomes.into_iter().flatten().fold(BatchState::new(), |mut acc, state| {
            acc.merge(state);
            acc
        });
        let diagnostic_count = state.diagnostic_count();
        let interrupted = self.interrupt.is_raised();

        let summary = BatchSummary {
            processed_count: state.processed,
            success_count: state.succeeded,
            failed_count: state.failed(),
            interrupted,
            started_at,
            finished_at: Utc::now(),
            glyphs: state.glyphs,
        };
        write_json(&self.config.output_root.join(SUMMARY_FILE), &summary)?;

        if interrupted {
            log::warn!(
                "[BATCH] interrupted after {} glyphs ({} succeeded), partial summary written",
                summary.processed_count,
                summary.success_count
            );
        } else {
            log::info!(
                "[BATCH] finished {} glyphs in {:.2?}: {} succeeded, {} failed, {} diagnostics",
                summary.processed_count,
                timer.elapsed(),
                summary.success_count,
                summary.failed_count,
                diagnostic_count
            );
        }
        Ok(summary)
    }
}

fn process_one(font: &dyn FontSource, config: &ExportConfig, emoji: String) -> GlyphSummary {
    let mut diagnostics = Diagnostics::new();
    match GlyphProcessor::new(font, config).process(&emoji, &mut diagnostics) {
        Ok(output) => GlyphSummary {
            emoji,
            success: true,
            reason: None,
            out_dir: Some(output.out_dir.display().to_string()),
            exported: output.manifest.layers.len(),
            diagnostics: diagnostics.into_vec(),
        },
        Err(err) => {
            let kind = err.kind();
            log::warn!("[GLYPH {}] skipped: {}", emoji, err);
            diagnostics.push(Diagnostic::new(kind).with_detail(err.to_string()));
            GlyphSummary {
                emoji,
                success: false,
                reason: Some(kind.as_str().to_string()),
                out_dir: None,
                exported: 0,
                diagnostics: diagnostics.into_vec(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(emoji: &str, success: bool) -> GlyphSummary {
        GlyphSummary {
            emoji: emoji.to_string(),
            success,
            reason: None,
            out_dir: None,
            exported: 0,
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_diagnostic_count_spans_glyphs() {
        use colrsplit_types::DiagnosticKind;

        let mut noisy = summary("a", true);
        noisy.diagnostics.push(Diagnostic::new(DiagnosticKind::InvalidPathSkipped));
        noisy.diagnostics.push(Diagnostic::new(DiagnosticKind::NoGlyphExtracted));
        let mut failed = summary("b", false);
        failed.diagnostics.push(Diagnostic::new(DiagnosticKind::GlyphNotFound));

        let mut state = BatchState::new();
        state.record(noisy);
        let mut other = BatchState::new();
        other.record(failed);
        state.merge(other);
        assert_eq!(state.diagnostic_count(), 3);
    }

    #[test]
    fn test_state_counts_failures() {
        let mut state = BatchState::new();
        state.record(summary("a", true));
        state.record(summary("b", false));
        assert_eq!((state.processed, state.succeeded, state.failed()), (2, 1, 1));
    }

    #[test]
    fn test_merge_is_ordered_concatenation() {
        let mut left = BatchState::new();
        left.record(summary("a", true));
        let mut right = BatchState::new();
        right.record(summary("b", false));
        right.record(summary("c", true));
        left.merge(right);
        assert_eq!(left.processed, 3);
        assert_eq!(left.succeeded, 2);
        assert_eq!(left.glyphs.iter().map(|g| g.emoji.as_str()).collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
