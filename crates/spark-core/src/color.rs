// File: crates/spark-core/src/color.rs
// Summary: CSS colour parsing, formatting and highlight lightening.

use std::fmt;
use std::str::FromStr;

use crate::geometry::clip;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` and a few names.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() != 4 {
                return None;
            }
            let alpha: f64 = parts[3].parse().ok()?;
            return Some(Self::rgba(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
                (clip(alpha, 0.0, 1.0) * 255.0).round() as u8,
            ));
        }
        if let Some(args) = lower.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return None;
            }
            return Some(Self::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?));
        }
        named(&lower)
    }

    /// Multiply every channel by `factor`, rounding and clipping to `0..=255`.
    pub fn lighten(self, factor: f64) -> Self {
        let scale = |c: u8| clip((c as f64 * factor).round(), 0.0, 255.0) as u8;
        Self { r: scale(self.r), g: scale(self.g), b: scale(self.b), a: self.a }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = self.a as f64 / 255.0;
            write!(f, "rgba({},{},{},{:.3})", self.r, self.g, self.b, alpha)
        }
    }
}

impl FromStr for Color {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s).ok_or_else(|| format!("unrecognised colour `{s}`"))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let nibble = |c: char| c.to_digit(16).map(|d| d as u8);
    let chars: Vec<char> = hex.chars().collect();
    match chars.len() {
        3 => {
            let r = nibble(chars[0])?;
            let g = nibble(chars[1])?;
            let b = nibble(chars[2])?;
            Some(Color::rgb(r * 17, g * 17, b * 17))
        }
        6 | 8 => {
            let byte = |i: usize| Some(nibble(chars[i])? * 16 + nibble(chars[i + 1])?);
            let a = if chars.len() == 8 { byte(6)? } else { 255 };
            Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, a))
        }
        _ => None,
    }
}

fn channel(s: &str) -> Option<u8> {
    let v: f64 = s.parse().ok()?;
    Some(clip(v.round(), 0.0, 255.0) as u8)
}

fn named(name: &str) -> Option<Color> {
    let c = match name {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "purple" => Color::rgb(128, 0, 128),
        "transparent" => Color::rgba(0, 0, 0, 0),
        _ => return None,
    };
    Some(c)
}
