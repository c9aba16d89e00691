//! Highlight colours for the spoken word

use crate::{Result, TalkError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// `RRGGBB` or `AARRGGBB`, optionally prefixed with `#` or `0x`
///
/// INI readers may take a leading `#` for a comment, so config files use the
/// `0x` form.
static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:#|0[xX])?([0-9a-fA-F]{8}|[0-9a-fA-F]{6})$")
        .expect("hex colour pattern is valid")
});

/// Colour names accepted in the config file
static NAMED_COLORS: Lazy<HashMap<&'static str, Color>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("black", Color::rgb(0x00, 0x00, 0x00));
    m.insert("white", Color::rgb(0xff, 0xff, 0xff));
    m.insert("red", Color::rgb(0xff, 0x00, 0x00));
    m.insert("green", Color::rgb(0x00, 0xff, 0x00));
    m.insert("blue", Color::rgb(0x00, 0x00, 0xff));
    m.insert("yellow", Color::rgb(0xff, 0xff, 0x00));
    m.insert("cyan", Color::rgb(0x00, 0xff, 0xff));
    m.insert("magenta", Color::rgb(0xff, 0x00, 0xff));
    m.insert("gray", Color::rgb(0x88, 0x88, 0x88));
    m.insert("grey", Color::rgb(0x88, 0x88, 0x88));
    m
});

/// An sRGB colour with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from a packed `0xAARRGGBB` value
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Fully transparent colours draw nothing
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl FromStr for Color {
    type Err = TalkError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(caps) = HEX_COLOR.captures(s) {
            let digits = &caps[1];
            let value = u32::from_str_radix(digits, 16)
                .map_err(|e| TalkError::Config(format!("Invalid colour {}: {}", s, e)))?;
            return Ok(if digits.len() == 6 {
                Color::from_argb(0xff00_0000 | value)
            } else {
                Color::from_argb(value)
            });
        }

        NAMED_COLORS
            .get(s.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| TalkError::Config(format!("Unknown colour: {}", s)))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
        }
    }
}

/// Decoration applied to the word being spoken
///
/// Either colour may be absent. An absent colour is simply not drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightStyle {
    pub background: Option<Color>,
    pub foreground: Option<Color>,
}

impl HighlightStyle {
    pub fn new(background: Option<Color>, foreground: Option<Color>) -> Self {
        Self {
            background,
            foreground,
        }
    }

    /// Whether applying this style changes how text looks
    pub fn is_visible(&self) -> bool {
        let drawn = |c: &Option<Color>| c.is_some_and(|c| !c.is_transparent());
        drawn(&self.background) || drawn(&self.foreground)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#ff8000".parse::<Color>().unwrap(), Color::rgb(0xff, 0x80, 0x00));
        assert_eq!(
            "#80112233".parse::<Color>().unwrap(),
            Color::rgba(0x11, 0x22, 0x33, 0x80)
        );
        assert_eq!("0x00ff00".parse::<Color>().unwrap(), Color::rgb(0, 0xff, 0));
        assert_eq!("0000ff".parse::<Color>().unwrap(), Color::rgb(0, 0, 0xff));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Yellow".parse::<Color>().unwrap(), Color::rgb(0xff, 0xff, 0x00));
        assert_eq!(" black ".parse::<Color>().unwrap(), Color::rgb(0, 0, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("0x1234567".parse::<Color>().is_err());
        assert!("chartreuse-ish".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "#010203");
        assert_eq!(Color::rgba(1, 2, 3, 0).to_string(), "#00010203");
    }

    #[test]
    fn test_style_visibility() {
        assert!(!HighlightStyle::default().is_visible());
        assert!(HighlightStyle::new(Some(Color::rgb(1, 1, 1)), None).is_visible());
        assert!(HighlightStyle::new(None, Some(Color::rgb(1, 1, 1))).is_visible());
        assert!(!HighlightStyle::new(Some(Color::rgba(1, 1, 1, 0)), None).is_visible());
    }
}
