//! Linear RGB color used by the rasterizer and render settings
use serde::{Deserialize, Serialize};

/// RGB color with channels nominally in the 0.0-1.0 range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);
    pub const LIGHT_GRAY: Self = Self::new(0.75, 0.75, 0.75);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation, `t = 0` yields `self`
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Weighted sum of three colors (barycentric blend)
    pub fn blend3(c0: Color, c1: Color, c2: Color, w0: f32, w1: f32, w2: f32) -> Color {
        Color::new(
            w0 * c0.r + w1 * c1.r + w2 * c2.r,
            w0 * c0.g + w1 * c1.g + w2 * c2.g,
            w0 * c0.b + w1 * c1.b + w2 * c2.b,
        )
    }

    /// Clamp every channel into [0, 1]
    pub fn clamped(self) -> Color {
        Color::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    /// Perceived brightness (Rec. 601 weights)
    pub fn luminance(&self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        let a = Color::RED;
        let b = Color::BLUE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        let mid = a.lerp(b, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert!((mid.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_and_rgb8() {
        let c = Color::new(1.5, -0.2, 0.5).clamped();
        assert_eq!(c, Color::new(1.0, 0.0, 0.5));
        assert_eq!(Color::new(1.5, -0.2, 0.5).to_rgb8(), [255, 0, 128]);
    }

    #[test]
    fn test_blend3_weights() {
        let c = Color::blend3(Color::RED, Color::GREEN, Color::BLUE, 0.2, 0.3, 0.5);
        assert!((c.r - 0.2).abs() < 1e-6);
        assert!((c.g - 0.3).abs() < 1e-6);
        assert!((c.b - 0.5).abs() < 1e-6);
    }
}
