//! Font sources for layered color glyphs.
//!
//! Two [`FontSource`] implementations live here: [`OpenTypeFont`] reads
//! binary fonts with COLR and CPAL tables, [`JsonFont`] reads JSON font
//! descriptions. Both decode their color tables into owned paint trees at
//! load time.

mod colr;
mod json;
mod opentype;
mod outline;

pub use colr::MAX_PAINT_DEPTH;
pub use json::JsonFont;
pub use opentype::OpenTypeFont;

use colrsplit_traits::{FontError, FontSource};
use std::path::Path;
use std::sync::Arc;

/// Loads a font, choosing the source by file extension: `.json` files are
/// JSON descriptions, anything else is parsed as a binary font.
pub fn load_font(path: impl AsRef<Path>) -> Result<Arc<dyn FontSource>, FontError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(Arc::new(JsonFont::from_path(path)?))
    } else {
        Ok(Arc::new(OpenTypeFont::from_path(path)?))
    }
}
