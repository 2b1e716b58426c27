use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

/// A 24-bit color, stored in files as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Upper-case `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Accepts `#RGB`, `#RRGGBB`, with or without the `#`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(err()),
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| err());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_short_and_bare_forms() {
        assert_eq!("#4C9141".parse(), Ok(Rgb::new(0x4C, 0x91, 0x41)));
        assert_eq!("4c9141".parse(), Ok(Rgb::new(0x4C, 0x91, 0x41)));
        assert_eq!("#abc".parse(), Ok(Rgb::new(0xAA, 0xBB, 0xCC)));
        assert_eq!(" #00b4d8 ".parse(), Ok(Rgb::new(0x00, 0xB4, 0xD8)));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#", "#12345", "#GGGGGG", "red", "#1234567"] {
            assert!(bad.parse::<Rgb>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn hex_is_normalized_to_upper_case() {
        let color: Rgb = "#a1b2c3".parse().unwrap();
        assert_eq!(color.to_hex(), "#A1B2C3");
        assert_eq!(
            serde_json::to_string(&color).unwrap(),
            "\"#A1B2C3\"".to_string()
        );
    }

    #[test]
    fn invalid_color_in_json_is_a_deserialize_error() {
        assert!(serde_json::from_str::<Rgb>("\"teal\"").is_err());
    }
}
