/// Strips all whitespace and upper-cases command letters.
///
/// `"M0 0 L1 1 Z"` and `"m0 0l1 1z"` normalize to the same string. Note that
/// this folds relative commands into absolute ones, which is acceptable for
/// outlines produced by [`to_svg_d`](crate::format::to_svg_d) since those
/// are always absolute.
pub fn normalize_path_data(d: &str) -> String {
    d.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Content hash of normalized path data, as lowercase hex.
pub fn fingerprint(d: &str) -> String {
    blake3::hash(normalize_path_data(d).as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_variants_share_fingerprint() {
        assert_eq!(fingerprint("M0 0 L1 1 Z"), fingerprint("M0 0L1 1Z"));
        assert_eq!(fingerprint("M0 0 L1 1 Z"), fingerprint(" m0 0\tl1 1 z\n"));
    }

    #[test]
    fn test_different_paths_differ() {
        assert_ne!(fingerprint("M0 0 L1 1 Z"), fingerprint("M0 0 L1 2 Z"));
    }

    #[test]
    fn test_normalize_strips_and_uppercases() {
        assert_eq!(normalize_path_data("m 0 0 l 1 1 z"), "M00L11Z");
    }
}
