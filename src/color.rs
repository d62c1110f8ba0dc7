//! Color and pixel output

pub use glam::Vec3A as Color;

pub mod colors {
    use super::Color;

    pub const WHITE: Color = Color::ONE;
    pub const BLACK: Color = Color::ZERO;
    /// Returned by image-backed textures whose file could not be loaded.
    pub const MISSING: Color = Color::from_array([0.0, 1.0, 1.0]);
}

/// Conversion from decoded image pixels into linear colors
pub trait FromPixel<P: image::Pixel> {
    fn from_pixel(p: P) -> Self;
}

// sdr pixels
impl FromPixel<image::Rgb<u8>> for Color {
    fn from_pixel(p: image::Rgb<u8>) -> Self {
        Self::from_array(p.0.map(|channel| (channel as f32 / u8::MAX as f32).clamp(0.0, 1.0)))
    }
}

// hdr pixels
impl FromPixel<image::Rgb<f32>> for Color {
    fn from_pixel(p: image::Rgb<f32>) -> Self {
        Self::from_array(p.0)
    }
}

/// Radiance above this is white after tone mapping, and squaring it stays finite.
const RADIANCE_LIMIT: f32 = 1.0e6;

/// ACES filmic tone mapping curve (Narkowicz fit), output clamped to `[0, 1]`.
pub fn tonemap(color: Color) -> Color {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;

    let color = color.min(Color::splat(RADIANCE_LIMIT));
    let mapped = (color * (A * color + B)) / (color * (C * color + D) + E);
    mapped.clamp(Color::ZERO, Color::ONE)
}

/// Gamma 2 correction.
pub fn gamma(color: Color) -> Color {
    Color::from_array(color.to_array().map(f32::sqrt))
}

/// Encodes a linear radiance value into 8-bit RGB.
///
/// Non-finite channels are zeroed first, then the value is tone mapped and gamma corrected.
pub fn encode(color: Color) -> [u8; 3] {
    let sanitized = Color::from_array(
        color
            .to_array()
            .map(|channel| if channel.is_finite() { channel } else { 0.0 }),
    );
    gamma(tonemap(sanitized))
        .to_array()
        .map(|channel| (256.0 * channel.clamp(0.0, 0.9999)) as u8)
}
