// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;

use serde::Serialize;

/// An RGB color as sent to a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` (or `rrggbb`) hex string.
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("Invalid hex color format: {}", hex));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("Invalid hex color: {}", e))
        };

        Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Looks up a color by name. Includes the sunrise palette.
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name.to_lowercase().as_str() {
            "red" => Ok(Color::new(255, 0, 0)),
            "green" => Ok(Color::new(0, 255, 0)),
            "blue" => Ok(Color::new(0, 0, 255)),
            "white" => Ok(Color::WHITE),
            "black" => Ok(Color::BLACK),
            "yellow" => Ok(Color::new(255, 255, 0)),
            "cyan" => Ok(Color::new(0, 255, 255)),
            "magenta" => Ok(Color::new(255, 0, 255)),
            "orange" => Ok(Color::new(255, 165, 0)),
            "purple" => Ok(Color::new(128, 0, 128)),
            "deep_red" => Ok(palette::DEEP_RED),
            "warm_orange" => Ok(palette::WARM_ORANGE),
            "bright_orange" => Ok(palette::BRIGHT_ORANGE),
            "warm_yellow" => Ok(palette::WARM_YELLOW),
            _ => Err(format!("Unknown color name: {}", name)),
        }
    }

    /// Parses either a hex string or a color name.
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.starts_with('#') {
            Color::from_hex(value)
        } else {
            Color::from_name(value).or_else(|e| Color::from_hex(value).map_err(|_| e))
        }
    }

    /// Linearly interpolate between two colors, channel by channel.
    /// `ratio` 0.0 returns `self` and 1.0 returns `other`. The ratio is not clamped;
    /// each channel is truncated toward zero (and saturates at the u8 bounds).
    pub fn lerp(&self, other: &Color, ratio: f64) -> Self {
        let lerp_channel =
            |from: u8, to: u8| (f64::from(from) + (f64::from(to) - f64::from(from)) * ratio) as u8;

        Self {
            r: lerp_channel(self.r, other.r),
            g: lerp_channel(self.g, other.g),
            b: lerp_channel(self.b, other.b),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Linearly interpolate a brightness percentage, truncating toward zero.
pub fn lerp_brightness(from: u8, to: u8, ratio: f64) -> u8 {
    (f64::from(from) + (f64::from(to) - f64::from(from)) * ratio) as u8
}

/// The sunrise color progression.
pub mod palette {
    use super::Color;

    /// Pre-dawn.
    pub const DEEP_RED: Color = Color::new(80, 20, 0);
    /// Early sunrise.
    pub const WARM_ORANGE: Color = Color::new(200, 80, 0);
    pub const BRIGHT_ORANGE: Color = Color::new(255, 140, 0);
    /// Morning.
    pub const WARM_YELLOW: Color = Color::new(255, 220, 150);
}

#[cfg(test)]
mod test {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);
    const BLUE: Color = Color::new(0, 0, 255);

    #[test]
    fn test_lerp_endpoints() {
        let pairs = [
            (RED, BLUE),
            (Color::BLACK, Color::WHITE),
            (palette::DEEP_RED, palette::WARM_YELLOW),
            (Color::new(13, 200, 77), Color::new(250, 3, 77)),
        ];

        for (from, to) in pairs {
            assert_eq!(from.lerp(&to, 0.0), from);
            assert_eq!(from.lerp(&to, 1.0), to);
        }
    }

    #[test]
    fn test_lerp_monotonic() {
        let from = Color::new(10, 250, 100);
        let to = Color::new(240, 5, 100);

        let mut previous = from;
        for i in 1..=100 {
            let current = from.lerp(&to, f64::from(i) / 100.0);
            assert!(current.r >= previous.r, "red went backwards at {}", i);
            assert!(current.g <= previous.g, "green went backwards at {}", i);
            assert_eq!(current.b, 100);
            previous = current;
        }
    }

    #[test]
    fn test_lerp_truncates() {
        // 255 + (0 - 255) * 0.5 = 127.5
        assert_eq!(RED.lerp(&BLUE, 0.5), Color::new(127, 0, 127));
        assert_eq!(lerp_brightness(10, 100, 0.5), 55);
        assert_eq!(lerp_brightness(100, 10, 0.25), 77);
        assert_eq!(lerp_brightness(1, 2, 0.99), 1);
    }

    #[test]
    fn test_lerp_does_not_clamp_ratio() {
        assert_eq!(lerp_brightness(10, 20, 2.0), 30);
        assert_eq!(lerp_brightness(10, 20, -0.5), 5);
        // Out of range channel values saturate rather than wrap.
        assert_eq!(Color::new(200, 0, 0).lerp(&Color::new(250, 0, 0), 2.0).r, 255);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Color::parse("#ff8800").unwrap(), Color::new(255, 136, 0));
        assert_eq!(Color::parse("00ff00").unwrap(), Color::new(0, 255, 0));
        assert_eq!(Color::parse("Red").unwrap(), RED);
        assert_eq!(Color::parse("warm_yellow").unwrap(), palette::WARM_YELLOW);
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("chartreuse").is_err());
        assert!(Color::parse("#gg0000").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Color::new(255, 136, 0).to_string(), "#ff8800");
    }
}
