//! Output file and directory names.

use itertools::Itertools;

/// `U+XXXX` for a single codepoint, at least four hex digits.
pub fn codepoint_label(cp: u32) -> String {
    format!("U+{:04X}", cp)
}

/// Directory name for an emoji sequence: every codepoint, joined by `-`.
///
/// `"👨‍👩"` becomes `U+1F468-U+200D-U+1F469`.
pub fn codepoint_dir_name(emoji: &str) -> String {
    emoji.chars().map(|c| codepoint_label(c as u32)).join("-")
}

pub fn codepoint_labels(emoji: &str) -> Vec<String> {
    emoji.chars().map(|c| codepoint_label(c as u32)).collect()
}

/// `emoji_layer_03.svg` for index 3 with two-digit padding.
pub fn layer_file_name(index: usize, pad_digits: usize) -> String {
    format!("emoji_layer_{:0width$}.svg", index, width = pad_digits)
}

pub const METADATA_FILE: &str = "emoji_layers_metadata.json";
pub const PAINT_DUMP_FILE: &str = "paint_dump.json";
pub const SUMMARY_FILE: &str = "batch_summary.json";
pub const EMOJI_LIST_FILE: &str = "emoji_list.txt";
