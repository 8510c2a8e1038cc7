// src/pipeline/builder.rs
use super::batch::BatchRunner;
use super::config::ExportConfig;
use crate::error::PipelineError;
use crate::interrupt::InterruptFlag;
use colrsplit_executor::ExecutorImpl;
use colrsplit_font::load_font;
use colrsplit_traits::FontSource;
use std::path::Path;
use std::sync::Arc;

/// A builder for creating a `BatchRunner`.
#[derive(Default)]
pub struct BatchBuilder {
    font: Option<Arc<dyn FontSource>>,
    config: ExportConfig,
    executor: Option<ExecutorImpl>,
    interrupt: InterruptFlag,
}

impl BatchBuilder {
    pub fn new() -> Self { Default::default() }

    /// Uses an already loaded font source.
    pub fn with_font(mut self, font: Arc<dyn FontSource>) -> Self { self.font = Some(font); self }

    /// Loads a font file. `.json` descriptions and binary OpenType fonts are both accepted.
    /// Fails when the file lacks color-layer or palette tables.
    pub fn with_font_path<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.font = Some(load_font(path.as_ref())?);
        Ok(self)
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self { self.config = config; self }

    /// Overrides the worker count from the config.
    pub fn with_jobs(mut self, jobs: usize) -> Self { self.config.jobs = jobs; self }

    /// Uses a specific executor instead of one derived from `jobs`.
    pub fn with_executor(mut self, executor: ExecutorImpl) -> Self { self.executor = Some(executor); self }

    /// Shares an interrupt flag, typically one wired to Ctrl-C.
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self { self.interrupt = interrupt; self }

    /// Consumes the builder and creates the `BatchRunner`.
    pub fn build(self) -> Result<BatchRunner, PipelineError> {
        let font = self.font.ok_or_else(|| {
            PipelineError::Config("No font has been configured. Use `with_font` or `with_font_path`.".to_string())
        })?;
        self.config.validate()?;
        let executor = self.executor.unwrap_or_else(|| ExecutorImpl::with_jobs(self.config.jobs));
        Ok(BatchRunner::new(font, self.config, executor, self.interrupt))
    }
}
