//! Path handling between the font and the merger.
//!
//! Outlines come out of the font source as [`kurbo::BezPath`]s already in
//! device space. They are formatted to SVG path data once, and everything
//! after that (closure, validity, deduplication) works on that text.

pub mod fingerprint;
pub mod format;
pub mod outline;
pub mod sanitize;

pub use fingerprint::{fingerprint, normalize_path_data};
pub use format::{affine_to_svg_matrix, fmt_num, to_svg_d};
pub use outline::OutlineExtractor;
pub use sanitize::{ensure_closed, is_valid, path_length, sanitize};
