use kurbo::{BezPath, ParamCurveArclen};

const ARCLEN_ACCURACY: f64 = 0.1;

/// Appends a close command unless the path already ends with one.
///
/// Idempotent. Empty input stays empty.
pub fn ensure_closed(d: &str) -> String {
    let trimmed = d.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.ends_with(['z', 'Z']) {
        trimmed.to_string()
    } else {
        format!("{} Z", trimmed)
    }
}

/// A path is drawable when it has at least one command besides move/close.
pub fn is_valid(d: &str) -> bool {
    d.chars()
        .any(|c| matches!(c.to_ascii_uppercase(), 'L' | 'C' | 'Q' | 'S' | 'T' | 'A' | 'H' | 'V'))
}

/// Closed path data, or `None` when nothing drawable remains.
pub fn sanitize(d: &str) -> Option<String> {
    let closed = ensure_closed(d);
    is_valid(&closed).then_some(closed)
}

/// Total arc length over all segments.
pub fn path_length(path: &BezPath) -> f64 {
    path.segments().map(|seg| seg.arclen(ARCLEN_ACCURACY)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_closed_appends_once() {
        let once = ensure_closed("M0 0 L1 1");
        assert_eq!(once, "M0 0 L1 1 Z");
        assert_eq!(ensure_closed(&once), once);
    }

    #[test]
    fn test_ensure_closed_idempotent_on_assorted_inputs() {
        for d in ["", "   ", "M0 0", "M0 0 L5 5 z", "M0 0 L5 5 Z  ", "M1 1 C2 2 3 3 4 4"] {
            let once = ensure_closed(d);
            assert_eq!(ensure_closed(&once), once, "input {:?}", d);
            assert!(once.is_empty() || once.ends_with(['z', 'Z']));
        }
    }

    #[test]
    fn test_sanitize_closes_or_rejects() {
        assert_eq!(sanitize("M0 0 L4 0 L4 4").as_deref(), Some("M0 0 L4 0 L4 4 Z"));
        assert_eq!(sanitize("M0 0 Z"), None);
        assert_eq!(sanitize(""), None);
    }

    #[test]
    fn test_is_valid_rejects_move_close_only() {
        assert!(!is_valid("M0 0 Z"));
        assert!(!is_valid(""));
        assert!(!is_valid("M0 0 M5 5 Z"));
    }

    #[test]
    fn test_is_valid_accepts_drawing_commands() {
        assert!(is_valid("M0 0 L1 1 Z"));
        assert!(is_valid("m0 0 q1 1 2 2 z"));
        assert!(is_valid("M0 0 C1 1 2 2 3 3"));
        assert!(is_valid("M0 0 h10 v10 z"));
    }

    #[test]
    fn test_path_length_of_square() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.line_to((0.0, 10.0));
        path.close_path();
        assert!((path_length(&path) - 40.0).abs() < 1e-6);
    }
}
