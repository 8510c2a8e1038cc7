use crate::palette::PaletteResolver;
use colrsplit_types::{ColorStop, GradientKind, GradientSpec, RawGradient};
use kurbo::Affine;

/// Resolves a raw gradient into a [`GradientSpec`].
///
/// Stops whose color cannot be resolved are dropped. Missing offsets are
/// synthesized as `i / (n - 1)` over the surviving stops (a lone stop gets
/// `0.0`), then stops are sorted by offset. Returns `None` when no stop
/// survives so the caller can fall back to a solid fill.
pub fn normalize(raw: &RawGradient, transform: Affine, palette: &PaletteResolver<'_>) -> Option<GradientSpec> {
    let resolved: Vec<(Option<f64>, _)> = raw
        .stops
        .iter()
        .filter_map(|stop| {
            let color = stop.color.as_ref()?;
            match palette.color(color) {
                Ok(rgba) => Some((stop.offset, rgba)),
                Err(e) => {
                    log::debug!("[GRADIENT] dropping stop: {}", e);
                    None
                }
            }
        })
        .collect();

    if resolved.is_empty() {
        return None;
    }

    let n = resolved.len();
    let mut stops: Vec<ColorStop> = resolved
        .into_iter()
        .enumerate()
        .map(|(i, (offset, color))| {
            let offset = offset.unwrap_or_else(|| if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 });
            ColorStop { offset: offset.clamp(0.0, 1.0), color }
        })
        .collect();
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    Some(GradientSpec {
        kind: GradientKind::of(&raw.anchors),
        anchors: raw.anchors.clone(),
        stops,
        extend: raw.extend,
        transform: transform.as_coeffs(),
    })
}
