use std::ops::Mul;

/// Straight (non-premultiplied) RGBA color with `f32` channels in `[0, 1]`.
///
/// Sprite colors are multiplied with the sampled texel in the fragment shader
/// and blended with `SrcAlpha / OneMinusSrcAlpha`, so channels are never
/// premultiplied on the CPU.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);
    pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0, 1.0);
    pub const CYAN: Color = Color::new(0.0, 1.0, 1.0, 1.0);
    pub const CORNFLOWER_BLUE: Color = Color::from_u8(100, 149, 237, 255);
    pub const DARK_GRAY: Color = Color::from_u8(64, 64, 64, 255);
    pub const GRAY: Color = Color::from_u8(128, 128, 128, 255);
    pub const LIGHT_GRAY: Color = Color::from_u8(192, 192, 192, 255);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from `0..=255` channel bytes.
    #[inline]
    pub const fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Same color with alpha replaced.
    #[inline]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

/// Scales every channel, alpha included (fade helper).
impl Mul<f32> for Color {
    type Output = Color;

    #[inline]
    fn mul(self, s: f32) -> Color {
        Color::new(self.r * s, self.g * s, self.b * s, self.a * s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_normalizes() {
        let c = Color::from_u8(255, 0, 51, 255);
        assert_eq!(c, Color::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn mul_scales_alpha_too() {
        assert_eq!(Color::WHITE * 0.5, Color::new(0.5, 0.5, 0.5, 0.5));
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        assert_eq!(Color::RED.with_alpha(0.25).to_array(), [1.0, 0.0, 0.0, 0.25]);
    }
}
