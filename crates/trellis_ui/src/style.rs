//! Node colors.
//!
//! Channels are 8-bit. The alpha channel is the node's opacity.

use serde::{Deserialize, Serialize};

/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (opacity).
    pub a: u8,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Creates a color from RGBA channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from RGB channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Creates a color from a packed 0xRRGGBBAA value.
    #[must_use]
    pub const fn hex(hex: u32) -> Self {
        Self::rgba(
            ((hex >> 24) & 0xFF) as u8,
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// Parses `RRGGBB` or `RRGGBBAA`, with an optional `#` or `0x` prefix.
    #[must_use]
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text
            .trim()
            .trim_start_matches('#')
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        let packed = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self::hex((packed << 8) | 0xFF)),
            8 => Some(Self::hex(packed)),
            _ => None,
        }
    }

    /// Formats as `RRGGBBAA`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Returns a copy with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Converts to normalized floats for vertex data.
    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
