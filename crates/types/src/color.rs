use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An 8-bit straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Multiplies the alpha channel by `factor` (clamped to `[0, 1]`).
    pub fn scale_alpha(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self { a: (self.a as f32 * factor).round() as u8, ..self }
    }

    /// Lowercase `#rrggbb`, or `#rrggbbaa` when the color is not fully opaque.
    ///
    /// The hex string is the grouping identity for solid fills, so two colors
    /// that differ only in alpha never share a group.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Opacity in `[0, 1]`, used for SVG `fill-opacity`/`stop-opacity`.
    pub fn opacity(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Parse a hex color string (#RGB, #RRGGBB or #RRGGBBAA format)
    pub fn parse_hex(s: &str) -> Result<Rgba, String> {
        let s = s.trim();
        let Some(hex) = s.strip_prefix('#') else {
            return Err(format!("Color must start with #, got: {}", s));
        };
        if !hex.is_ascii() {
            return Err(format!("Invalid hex color: {}", s));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("Invalid {} component: {}", name, e))
        };

        match hex.len() {
            3 => {
                // #RGB format - expand each digit
                let expand = |i: usize, name: &str| {
                    u8::from_str_radix(&hex[i..i + 1].repeat(2), 16)
                        .map_err(|e| format!("Invalid {} component: {}", name, e))
                };
                Ok(Rgba::opaque(expand(0, "red")?, expand(1, "green")?, expand(2, "blue")?))
            }
            6 => Ok(Rgba::opaque(channel(0..2, "red")?, channel(2..4, "green")?, channel(4..6, "blue")?)),
            8 => Ok(Rgba::new(
                channel(0..2, "red")?,
                channel(2..4, "green")?,
                channel(4..6, "blue")?,
                channel(6..8, "alpha")?,
            )),
            _ => Err(format!("Invalid hex color length: expected 3, 6 or 8, got {}", hex.len())),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Rgba", 4)?;
        s.serialize_field("r", &self.r)?;
        s.serialize_field("g", &self.g)?;
        s.serialize_field("b", &self.b)?;
        s.serialize_field("a", &self.a)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        fn default_alpha() -> u8 {
            255
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RgbaDef {
            Str(String),
            Map {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "default_alpha")]
                a: u8,
            },
        }

        match RgbaDef::deserialize(deserializer)? {
            RgbaDef::Str(s) => Self::parse_hex(&s).map_err(de::Error::custom),
            RgbaDef::Map { r, g, b, a } => Ok(Rgba { r, g, b, a }),
        }
    }
}

/// A palette entry as stored by the font, before channel reordering.
///
/// Color tables store entries blue-first. Some producers omit the alpha
/// byte; anything else is kept as `Malformed` so the resolver can report it
/// instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "channels", rename_all = "snake_case")]
pub enum RawColor {
    Bgra([u8; 4]),
    Bgr([u8; 3]),
    Malformed(String),
}

impl RawColor {
    /// Builds a raw entry from a channel slice of unknown length.
    pub fn from_channels(channels: &[u8]) -> Self {
        match *channels {
            [b, g, r, a] => RawColor::Bgra([b, g, r, a]),
            [b, g, r] => RawColor::Bgr([b, g, r]),
            _ => RawColor::Malformed(format!("expected 3 or 4 channels, got {}", channels.len())),
        }
    }

    /// Reorders to RGBA. `None` for malformed entries.
    pub fn to_rgba(&self) -> Option<Rgba> {
        match *self {
            RawColor::Bgra([b, g, r, a]) => Some(Rgba::new(r, g, b, a)),
            RawColor::Bgr([b, g, r]) => Some(Rgba::opaque(r, g, b)),
            RawColor::Malformed(_) => None,
        }
    }
}
