//! Per-layer SVG documents.
//!
//! Paths arrive in font units with y pointing up. Each document wraps them in
//! a `scale(1,-1)` group and sets the `viewBox` to the flipped em box, so
//! the artwork lands where a renderer would draw the glyph. Gradients are
//! emitted in the same user space as the paths they fill.

use colrsplit_path::{affine_to_svg_matrix, fmt_num};
use colrsplit_types::{Extend, Fill, FontMetrics, GradientAnchors, GradientSpec, Rgba};
use kurbo::Affine;
use std::fmt::Write;

/// Output dimensions shared by every layer of a glyph.
#[derive(Debug, Clone, Copy)]
pub struct SvgCanvas {
    /// Rendered width and height in pixels.
    pub size: u32,
    pub metrics: FontMetrics,
}

impl SvgCanvas {
    /// `min-x min-y width height` covering the em box after the y flip.
    pub fn view_box(&self) -> String {
        let upem = self.metrics.units_per_em.max(1) as f64;
        let ascender = self.metrics.ascender as f64;
        let descender = self.metrics.descender as f64;
        let height = if ascender > descender { ascender - descender } else { upem };
        format!("0 {} {} {}", fmt_num(-ascender), fmt_num(upem), fmt_num(height))
    }
}

/// One fill group ready to be drawn.
#[derive(Debug, Clone)]
pub struct SvgLayer<'a> {
    pub fill: &'a Fill,
    /// Element id for the gradient definition, when the fill has one.
    pub gradient_id: &'a str,
    pub paths: Vec<&'a str>,
}

pub fn render_layer(canvas: &SvgCanvas, layer: &SvgLayer<'_>) -> String {
    let mut defs = String::new();
    let fill_attrs = match layer.fill {
        Fill::Solid { color } => solid_attrs(*color),
        Fill::Gradient(spec) => {
            if write_gradient_def(&mut defs, layer.gradient_id, spec) {
                format!(" fill=\"url(#{})\"", layer.gradient_id)
            } else {
                // geometry we cannot express falls back to the first stop
                solid_attrs(layer.fill.representative_color())
            }
        }
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"{vb}\">",
        size = canvas.size,
        vb = canvas.view_box()
    );
    if !defs.is_empty() {
        let _ = writeln!(out, "<defs>{defs}</defs>");
    }
    let _ = writeln!(out, "<g transform=\"scale(1,-1)\">");
    for d in &layer.paths {
        let _ = writeln!(out, "<path d=\"{d}\"{fill_attrs} stroke=\"none\"/>");
    }
    out.push_str("</g>\n</svg>\n");
    out
}

fn solid_attrs(color: Rgba) -> String {
    let mut attrs = format!(" fill=\"{}\"", rgb_hex(color));
    if color.a != 255 {
        let _ = write!(attrs, " fill-opacity=\"{}\"", fmt_num(color.opacity() as f64));
    }
    attrs
}

/// `#rrggbb` without alpha; opacity goes into its own attribute.
fn rgb_hex(color: Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn spread_method(extend: Extend) -> &'static str {
    match extend {
        Extend::Pad => "pad",
        Extend::Repeat => "repeat",
        Extend::Reflect => "reflect",
    }
}

/// Writes a gradient element into `defs`. Returns `false` for gradients
/// with no SVG equivalent.
fn write_gradient_def(defs: &mut String, id: &str, spec: &GradientSpec) -> bool {
    let (tag, geometry) = match spec.anchors {
        GradientAnchors::Linear { x0, y0, x1, y1 } => (
            "linearGradient",
            format!(
                " x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"",
                fmt_num(x0),
                fmt_num(y0),
                fmt_num(x1),
                fmt_num(y1)
            ),
        ),
        GradientAnchors::Radial { x0, y0, r0, x1, y1, r1 } => (
            "radialGradient",
            format!(
                " cx=\"{}\" cy=\"{}\" r=\"{}\" fx=\"{}\" fy=\"{}\" fr=\"{}\"",
                fmt_num(x1),
                fmt_num(y1),
                fmt_num(r1),
                fmt_num(x0),
                fmt_num(y0),
                fmt_num(r0)
            ),
        ),
        GradientAnchors::Unknown => return false,
    };
    if spec.stops.is_empty() {
        return false;
    }

    let _ = write!(defs, "<{tag} id=\"{id}\" gradientUnits=\"userSpaceOnUse\"{geometry}");
    let transform = Affine::new(spec.transform);
    if transform != Affine::IDENTITY {
        let _ = write!(defs, " gradientTransform=\"{}\"", affine_to_svg_matrix(transform));
    }
    if spec.extend != Extend::Pad {
        let _ = write!(defs, " spreadMethod=\"{}\"", spread_method(spec.extend));
    }
    defs.push('>');
    for stop in &spec.stops {
        let _ = write!(
            defs,
            "<stop offset=\"{}\" stop-color=\"{}\"",
            fmt_num(stop.offset),
            rgb_hex(stop.color)
        );
        if stop.color.a != 255 {
            let _ = write!(defs, " stop-opacity=\"{}\"", fmt_num(stop.color.opacity() as f64));
        }
        defs.push_str("/>");
    }
    let _ = write!(defs, "</{tag}>");
    true
}
