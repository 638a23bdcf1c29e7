//! RGBA colors and the packed 32-bit pixel layout.
//!
//! Pixels are packed as a single `u32` with the channels laid out as
//! `R` in bits 24–31, `G` in bits 16–23, `B` in bits 8–15 and `A` in
//! bits 0–7.

use serde::{Deserialize, Serialize};

/// 8-bit per channel color with straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | self.a as u32
    }

    pub const fn from_packed(px: u32) -> Self {
        Self {
            r: (px >> 24) as u8,
            g: (px >> 16) as u8,
            b: (px >> 8) as u8,
            a: px as u8,
        }
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Rec. 601 luma of the color channels; alpha is ignored.
    pub fn luma(self) -> u8 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) as u8
    }
}

/// Composites `foreground` over `background` (both packed RGBA).
///
/// With `a = alpha(foreground) / 255`, each color channel becomes
/// `background * (1 - a) + foreground * a`.
///
/// - A fully transparent foreground returns `background` unchanged.
/// - A fully opaque foreground returns `foreground` unchanged.
/// - Any other blend produces a fully opaque result (alpha `255`).
#[inline]
pub fn blend_over(background: u32, foreground: u32) -> u32 {
    let alpha = foreground & 0xFF;
    if alpha == 0 {
        return background;
    }
    if alpha == 255 {
        return foreground;
    }

    let a = alpha as f32 / 255.0;
    let inv_a = 1.0 - a;
    let bg = Rgba::from_packed(background);
    let fg = Rgba::from_packed(foreground);
    let mix = |b: u8, f: u8| (b as f32 * inv_a + f as f32 * a) as u8;

    Rgba::rgb(mix(bg.r, fg.r), mix(bg.g, fg.g), mix(bg.b, fg.b)).to_packed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_layout_puts_red_in_the_high_byte() {
        let c = Rgba::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.to_packed(), 0x1234_5678);
        assert_eq!(Rgba::from_packed(0x1234_5678), c);
    }

    #[test]
    fn opaque_foreground_replaces_background() {
        let bg = Rgba::new(10, 20, 30, 40).to_packed();
        let fg = Rgba::rgb(200, 100, 50).to_packed();
        assert_eq!(blend_over(bg, fg), fg);
    }

    #[test]
    fn transparent_foreground_keeps_background() {
        let bg = Rgba::new(10, 20, 30, 40).to_packed();
        let fg = Rgba::new(200, 100, 50, 0).to_packed();
        assert_eq!(blend_over(bg, fg), bg);
    }

    #[test]
    fn partial_alpha_mixes_channels_and_forces_opaque() {
        let bg = Rgba::rgb(0, 0, 0).to_packed();
        let fg = Rgba::new(255, 255, 255, 51).to_packed();

        let out = Rgba::from_packed(blend_over(bg, fg));
        assert_eq!(out.r, 51);
        assert_eq!(out.g, 51);
        assert_eq!(out.b, 51);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn luma_weights_green_highest() {
        assert_eq!(Rgba::rgb(0, 0, 0).luma(), 0);
        assert!(Rgba::rgb(0, 255, 0).luma() > Rgba::rgb(255, 0, 0).luma());
        assert!(Rgba::rgb(255, 0, 0).luma() > Rgba::rgb(0, 0, 255).luma());
    }
}
