use kurbo::{Affine, BezPath, PathEl};
use std::fmt::Write;

/// Formats a path as SVG path data, one absolute command per element,
/// separated by single spaces.
///
/// A path with any non-finite coordinate formats to the empty string, so it
/// never survives [`crate::sanitize`].
pub fn to_svg_d(path: &BezPath) -> String {
    let mut d = String::new();
    if !path.elements().iter().all(is_finite_el) {
        return d;
    }
    for el in path.iter() {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match el {
            PathEl::MoveTo(p) => write!(d, "M{} {}", fmt_num(p.x), fmt_num(p.y)),
            PathEl::LineTo(p) => write!(d, "L{} {}", fmt_num(p.x), fmt_num(p.y)),
            PathEl::QuadTo(p1, p2) => write!(
                d,
                "Q{} {} {} {}",
                fmt_num(p1.x),
                fmt_num(p1.y),
                fmt_num(p2.x),
                fmt_num(p2.y)
            ),
            PathEl::CurveTo(p1, p2, p3) => write!(
                d,
                "C{} {} {} {} {} {}",
                fmt_num(p1.x),
                fmt_num(p1.y),
                fmt_num(p2.x),
                fmt_num(p2.y),
                fmt_num(p3.x),
                fmt_num(p3.y)
            ),
            PathEl::ClosePath => write!(d, "Z"),
        };
    }
    d
}

fn is_finite_el(el: &PathEl) -> bool {
    match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => p.is_finite(),
        PathEl::QuadTo(p1, p2) => p1.is_finite() && p2.is_finite(),
        PathEl::CurveTo(p1, p2, p3) => p1.is_finite() && p2.is_finite() && p3.is_finite(),
        PathEl::ClosePath => true,
    }
}

/// Compact number formatting: integers print bare, everything else with at
/// most three decimals and no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let rounded = v.round();
    if (rounded - v).abs() < 1e-6 {
        // also folds -0 into 0
        return format!("{}", rounded as i64);
    }

    let mut s = format!("{:.3}", v);
    while s.contains('.') && s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// `matrix(a b c d e f)` for an SVG `transform`/`gradientTransform` attribute.
pub fn affine_to_svg_matrix(xf: Affine) -> String {
    let c = xf.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_num(c[0]),
        fmt_num(c[1]),
        fmt_num(c[2]),
        fmt_num(c[3]),
        fmt_num(c[4]),
        fmt_num(c[5]),
    )
}
