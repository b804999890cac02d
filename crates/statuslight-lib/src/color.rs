//! Indicator colors: RGB triples with an implicit opaque alpha.

use std::fmt;

use serde::Serialize;

/// An RGB color as sent to the indicator. Alpha is implicit (always opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// All channels off. Used to blank the indicator on shutdown.
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Parse a color given on the command line.
///
/// Accepts:
/// - Hex: `"#FF0000"`, `"FF0000"`, `"#ff0000"`
/// - Named: `"red"`, `"green"`, `"blue"`, `"white"`, `"orange"`, `"yellow"`, `"purple"`, `"cyan"`, `"off"`/`"black"`
pub fn parse_color(s: &str) -> crate::error::Result<Color> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "red" => return Ok(Color::new(255, 0, 0)),
        "green" => return Ok(Color::new(0, 255, 0)),
        "blue" => return Ok(Color::new(0, 0, 255)),
        "white" => return Ok(Color::new(255, 255, 255)),
        "orange" => return Ok(Color::new(255, 128, 0)),
        "yellow" => return Ok(Color::new(255, 255, 0)),
        "purple" => return Ok(Color::new(128, 0, 255)),
        "cyan" => return Ok(Color::new(0, 255, 255)),
        "off" | "black" => return Ok(Color::BLACK),
        _ => {}
    }

    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(crate::StatuslightError::Color(format!(
            "Invalid color: {s} (use #RRGGBB or a color name)"
        )));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| crate::StatuslightError::Color(format!("Invalid hex color: {s}")))
    };
    Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
}
