use serde_json::{json, Value};

pub const SMILE: &str = "\u{1F600}";
pub const HEART: &str = "\u{2764}";

/// Palette 0: transparent, red, blue, green. Palette 1: yellow. Channels are blue-first.
pub fn palettes() -> Value {
    json!([
        [[0, 0, 0, 0], [0, 0, 255, 255], [255, 0, 0, 255], [0, 255, 0, 255]],
        [[0, 255, 255, 255]]
    ])
}

/// A font description with the given layer records, one base glyph `smile`
/// over all of them, and a second base glyph `heart` with no layers.
pub fn font_with_layers(layers: Value) -> Value {
    let count = layers.as_array().map_or(0, Vec::len);
    json!({
        "name": "fixture",
        "unitsPerEm": 1000,
        "ascender": 800,
        "descender": -200,
        "glyphs": {
            "smile": "M0 0 L1000 0 L1000 1000 L0 1000 Z",
            "heart": "M0 0 L10 0 L10 10 Z",
            "tri": "M0 0 L100 0 L50 80 Z",
            "square": "M0 0 L40 0 L40 40 L0 40 Z",
            "speck": "M0 0 L0.1 0 L0.1 0.1 Z",
            "dot": "M5 5 Z"
        },
        "cmap": {"U+1F600": "smile", "U+2764": "heart", "U+1F601": "smile"},
        "COLR": {
            "BaseGlyphRecords": [
                {"BaseGlyph": "smile", "FirstLayerIndex": 0, "NumLayers": count},
                {"BaseGlyph": "heart", "FirstLayerIndex": count, "NumLayers": 0}
            ],
            "LayerRecords": layers
        },
        "CPAL": {"palettes": palettes()}
    })
}

/// Two red layers drawing the same triangle.
pub fn duplicate_triangle_font() -> Value {
    font_with_layers(json!([
        {"LayerGlyph": "tri", "PaletteIndex": 1},
        {"LayerGlyph": "tri", "PaletteIndex": 1}
    ]))
}

/// A red square under a blue triangle filled with a linear gradient.
pub fn gradient_font() -> Value {
    font_with_layers(json!([
        {"LayerGlyph": "square", "PaletteIndex": 1},
        {
            "Glyph": "tri",
            "Paint": {
                "PaintLinearGradient": {
                    "x0": 0, "y0": 0, "x1": 100, "y1": 0,
                    "ColorLine": {"Extend": "repeat", "ColorStop": [
                        {"StopOffset": 0.0, "PaletteIndex": 2},
                        {"StopOffset": 1.0, "PaletteIndex": 3}
                    ]}
                }
            }
        }
    ]))
}
