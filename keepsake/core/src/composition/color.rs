//! Surface-agnostic RGBA color
//!
//! Templates describe colors with this type; the rasterizer maps them onto
//! `image::Rgba<u8>` pixels. Decoration background overrides are stored as
//! hex strings in config and parsed through [`Color::from_hex`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// RGBA color with 8-bit channels
///
/// # Examples
///
/// ```
/// use keepsake_core::composition::Color;
///
/// let wax = Color::rgb(142, 28, 36);
/// assert_eq!(wax.a, 255);
/// assert_eq!(wax.to_hex(), "#8e1c24");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
    /// Alpha component (0=transparent, 255=opaque)
    pub a: u8,
}

impl Color {
    /// Paper white used by most card backgrounds
    pub const PAPER: Color = Color::rgb(250, 246, 238);
    /// Near-black ink
    pub const INK: Color = Color::rgb(34, 30, 28);
    /// Neutral grey for dividers and muted text
    pub const GRAPHITE: Color = Color::rgb(120, 116, 110);

    /// Create a fully opaque color from RGB components
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha channel
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully transparent color
    #[must_use]
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// Check if this color is fully transparent
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Return the same color with a different alpha
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    ///
    /// Returns `None` for anything else.
    ///
    /// ```
    /// use keepsake_core::composition::Color;
    ///
    /// assert_eq!(Color::from_hex("#ff000080"), Some(Color::rgba(255, 0, 0, 128)));
    /// assert_eq!(Color::from_hex("nope"), None);
    /// ```
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Convert to a CSS-style hex string (#RRGGBB or #RRGGBBAA)
    #[must_use]
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Blend this color over another using the "over" operator
    #[must_use]
    pub fn blend_over(&self, background: Color) -> Color {
        if self.a == 255 {
            return *self;
        }
        if self.a == 0 {
            return background;
        }

        let src_a = f32::from(self.a) / 255.0;
        let dst_a = f32::from(background.a) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        if out_a == 0.0 {
            return Color::transparent();
        }

        let blend = |src: u8, dst: u8| -> u8 {
            let s = f32::from(src) / 255.0;
            let d = f32::from(dst) / 255.0;
            let result = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            (result * 255.0).round() as u8
        };

        Color {
            r: blend(self.r, background.r),
            g: blend(self.g, background.g),
            b: blend(self.b, background.b),
            a: (out_a * 255.0).round() as u8,
        }
    }

    /// Linearly interpolate between two colors (`t` clamped to 0..=1)
    #[must_use]
    pub fn lerp(&self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let lerp_u8 = |a: u8, b: u8| -> u8 {
            let a = f32::from(a);
            let b = f32::from(b);
            (a + (b - a) * t).round() as u8
        };

        Color {
            r: lerp_u8(self.r, other.r),
            g: lerp_u8(self.g, other.g),
            b: lerp_u8(self.b, other.b),
            a: lerp_u8(self.a, other.a),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::transparent()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
