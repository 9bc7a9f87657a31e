use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{6})$").unwrap());

const NEON_PALETTE: [(&str, &str); 16] = [
    ("Pink", "#ec4fb4"),
    ("Neon Blue", "#00a6ff"),
    ("Electric Purple", "#b100ff"),
    ("UV Violet", "#6a00ff"),
    ("Fuchsia", "#ff00ff"),
    ("Hot Pink", "#ff6ec7"),
    ("Neon Red", "#ff1744"),
    ("Neon Orange", "#ff7a00"),
    ("Amber", "#ffc400"),
    ("Neon Yellow", "#f8ff00"),
    ("Lime", "#c6ff00"),
    ("Electric Green", "#00ff66"),
    ("Neon Mint", "#00ffc8"),
    ("Aqua", "#2bd9fe"),
    ("Cyan", "#00fff0"),
    ("Cool White", "#e8f9ff"),
];

static PALETTE: Lazy<Vec<ColorSpec>> = Lazy::new(|| {
    NEON_PALETTE
        .iter()
        .map(|(name, hex)| ColorSpec::new(*name, *hex))
        .collect()
});

/// One selectable neon color. Names are unique within a palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub name: String,
    pub hex: String,
}

impl ColorSpec {
    pub fn new(name: impl Into<String>, hex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hex: hex.into(),
        }
    }
}

/// The built-in neon palette, in selection order.
pub fn palette() -> &'static [ColorSpec] {
    &PALETTE
}

/// Looks a color up by name (case-insensitive) or by exact hex.
pub fn find_color<'a>(palette: &'a [ColorSpec], key: &str) -> Option<&'a ColorSpec> {
    let key = key.trim();
    palette
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(key) || c.hex.eq_ignore_ascii_case(key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn from_hex(hex: &str) -> Option<Self> {
        let caps = HEX_RE.captures(hex.trim())?;
        let value = u32::from_str_radix(&caps[1], 16).ok()?;
        Some(Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Straight sRGB blend, `t = 0` is `self`, `t = 1` is `other`.
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
        }
    }
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_RE.is_match(value.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SteelTheme {
    Bright,
    #[default]
    Dark,
}

/// Three-tone metal used for washers, plates and strap faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteelPaint {
    pub hi: String,
    pub mid: String,
    pub lo: String,
}

impl SteelTheme {
    pub fn steel(self) -> SteelPaint {
        match self {
            SteelTheme::Dark => SteelPaint {
                hi: "#b8c0c7".to_string(),
                mid: "#80878e".to_string(),
                lo: "#3d4349".to_string(),
            },
            SteelTheme::Bright => SteelPaint {
                hi: "#d7dce1".to_string(),
                mid: "#9aa1a8".to_string(),
                lo: "#5a6168".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_is_ordered_and_valid() {
        let colors = palette();
        assert_eq!(colors.len(), 16);
        assert_eq!(colors[0], ColorSpec::new("Pink", "#ec4fb4"));
        assert_eq!(colors[1].name, "Neon Blue");
        assert!(colors.iter().all(|c| is_hex_color(&c.hex)));
    }

    #[test]
    fn palette_names_are_unique() {
        let colors = palette();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn find_color_by_name_or_hex() {
        assert_eq!(find_color(palette(), "neon blue").unwrap().hex, "#00a6ff");
        assert_eq!(find_color(palette(), "#FF7A00").unwrap().name, "Neon Orange");
        assert!(find_color(palette(), "beige").is_none());
    }

    #[test]
    fn rgb_parse_and_mix() {
        let gray = Rgb::from_hex("#a7adb4").unwrap();
        let pink = Rgb::from_hex("#ec4fb4").unwrap();
        assert_eq!(gray.mix(pink, 0.0), gray);
        assert_eq!(gray.mix(pink, 1.0), pink);
        assert_eq!(pink.to_hex(), "#ec4fb4");
        assert!(Rgb::from_hex("ec4fb4").is_none());
        assert!(Rgb::from_hex("#ec4fb").is_none());
    }
}
