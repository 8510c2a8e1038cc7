//! User interrupt handling.
//!
//! Ctrl-C does not kill the process. It raises a shared flag that the batch
//! checks before starting each glyph, so glyphs already running finish and
//! the summary is still written. A second Ctrl-C exits immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Raises the flag. Returns `true` when it was already raised, meaning
    /// the user asked twice.
    fn escalate(&self) -> bool {
        self.0.swap(true, Ordering::SeqCst)
    }

    /// Spawns a listener thread for Ctrl-C.
    ///
    /// The first Ctrl-C raises the flag. A second one exits the process
    /// right away with status 130, without waiting for running glyphs or
    /// writing the summary. The listener runs its own single-threaded runtime.
    pub fn listen_for_ctrl_c(&self) -> std::io::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let flag = self.clone();
        thread::Builder::new()
            .name("colrsplit-ctrl-c".to_string())
            .spawn(move || {
                runtime.block_on(async {
                    loop {
                        if let Err(e) = tokio::signal::ctrl_c().await {
                            log::error!("[INTERRUPT] Failed to listen for Ctrl-C: {}", e);
                            return;
                        }
                        if flag.escalate() {
                            log::error!("[INTERRUPT] Second Ctrl-C, exiting without a summary");
                            std::process::exit(130);
                        }
                        log::warn!("[INTERRUPT] Ctrl-C received, finishing running glyphs and writing summary");
                    }
                });
            })?;
        Ok(())
    }
}
