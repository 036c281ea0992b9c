//! Hex color parsing for painting resolved config colors

use egui::Color32;

/// An sRGB color parsed from `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        let (r, g, b, a) = match hex.len() {
            3 => (short(0)?, short(1)?, short(2)?, 0xFF),
            4 => (short(0)?, short(1)?, short(2)?, short(3)?),
            6 => (long(0)?, long(2)?, long(4)?, 0xFF),
            8 => (long(0)?, long(2)?, long(4)?, long(6)?),
            _ => return None,
        };
        Some(Self { r, g, b, a })
    }

    pub fn to_color32(self) -> Color32 {
        Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

/// Parse `value`, falling back to `fallback` (which must itself be valid)
pub fn color32_or(value: &str, fallback: &str) -> Color32 {
    HexColor::parse(value)
        .or_else(|| {
            tracing::warn!(color = %value, fallback, "Invalid hex color, using fallback");
            HexColor::parse(fallback)
        })
        .map(HexColor::to_color32)
        .unwrap_or(Color32::WHITE)
}
