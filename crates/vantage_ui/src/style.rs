//! Style primitives shared by widgets and the wire format.

/// An RGBA color, 8 bits per channel.
///
/// The wire form is exactly 4 raw bytes, big-endian RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF, 0xFF);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0x00, 0x00, 0x00, 0xFF);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0x00, 0x00, 0x00, 0x00);

    /// Creates a color from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Packs the color into its big-endian RGBA wire integer.
    #[must_use]
    pub const fn to_rgba(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | self.a as u32
    }

    /// Unpacks a color from its big-endian RGBA wire integer.
    #[must_use]
    pub const fn from_rgba(value: u32) -> Self {
        Self {
            r: (value >> 24) as u8,
            g: (value >> 16) as u8,
            b: (value >> 8) as u8,
            a: value as u8,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_round_trip() {
        let color = Color::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(Color::from_rgba(color.to_rgba()), color);
        assert_eq!(color.to_rgba(), 0x1234_5678);
    }
}
