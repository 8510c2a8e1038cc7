use colrsplit_types::LocalTransform;
use kurbo::{Affine, Vec2};

/// Builds the affine a node contributes on its own.
///
/// Parts multiply left to right in the order matrix, translate, scale,
/// rotate, affine. Applied to a point, the last part acts first.
pub fn local_affine(t: &LocalTransform) -> Affine {
    let mut local = t.matrix.map_or(Affine::IDENTITY, Affine::new);
    if let Some((dx, dy)) = t.translate {
        local = local * Affine::translate(Vec2::new(dx, dy));
    }
    if let Some((sx, sy)) = t.scale {
        local = local * Affine::scale_non_uniform(sx, sy);
    }
    if let Some(radians) = t.rotate {
        local = local * Affine::rotate(radians);
    }
    if let Some(coeffs) = t.affine {
        local = local * Affine::new(coeffs);
    }
    local
}

/// `ancestor ∘ local`: the child's own transform applies first, then every
/// enclosing transform from the inside out.
pub fn compose(ancestor: Affine, local: Affine) -> Affine {
    ancestor * local
}

/// Rotation about `(cx, cy)`.
pub fn rotate_around(radians: f64, cx: f64, cy: f64) -> Affine {
    Affine::rotate_about(radians, kurbo::Point::new(cx, cy))
}

/// Non-uniform scale about `(cx, cy)`.
pub fn scale_around(sx: f64, sy: f64, cx: f64, cy: f64) -> Affine {
    let center = Vec2::new(cx, cy);
    Affine::translate(center) * Affine::scale_non_uniform(sx, sy) * Affine::translate(-center)
}

/// Skew by the given angles (radians) about `(cx, cy)`.
///
/// Color-font skew angles are counter-clockwise, which flips the sign of the
/// x shear relative to kurbo's convention.
pub fn skew_around(x_radians: f64, y_radians: f64, cx: f64, cy: f64) -> Affine {
    let center = Vec2::new(cx, cy);
    let skew = Affine::new([1.0, y_radians.tan(), -x_radians.tan(), 1.0, 0.0, 0.0]);
    Affine::translate(center) * skew * Affine::translate(-center)
}
