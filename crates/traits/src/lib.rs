pub mod executor;
pub mod font;

pub use executor::{Executor, SyncExecutor};
pub use font::{FontError, FontSource, OutlineError, SharedFontData};
