//! Red-dominance shading
//!
//! Re-tints strongly red pixels toward a target colour while keeping their
//! relative intensity. Every other pixel is narrowed from 16 to 8 bits.

use crate::{Effect, ImageShadeResult, Rgba16Image};
use derivative::Derivative;
use derive_setters::Setters;
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Full scale of a 16-bit channel, used as the denominator of the tint scale.
const CHANNEL_RANGE: f64 = 65536.0;

/// Tint applied to qualifying pixels
#[derive(Debug, Clone, PartialEq, Eq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ShadeConfig {
    #[derivative(Default(value = "64"))]
    r: i32,

    #[derivative(Default(value = "64"))]
    g: i32,

    #[derivative(Default(value = "64"))]
    b: i32,
}

impl ShadeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rgb(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    pub fn r(&self) -> i32 {
        self.r
    }

    pub fn g(&self) -> i32 {
        self.g
    }

    pub fn b(&self) -> i32 {
        self.b
    }

    /// Shade a single 16-bit pixel into its 8-bit output.
    ///
    /// Qualifying pixels get `round(tint * r / 65536)` per channel, clamped
    /// to `0..=255`. The rest keep their colour with each channel shifted
    /// down to 8 bits. Alpha is shifted down in both cases.
    pub fn shade_pixel(&self, pixel: Rgba<u16>) -> Rgba<u8> {
        let [r, g, b, a] = pixel.0;
        let alpha = narrow(a);

        if !is_shadow(pixel) {
            return Rgba([narrow(r), narrow(g), narrow(b), alpha]);
        }

        let scale = f64::from(r) / CHANNEL_RANGE;
        Rgba([
            tint_channel(self.r, scale),
            tint_channel(self.g, scale),
            tint_channel(self.b, scale),
            alpha,
        ])
    }
}

/// Whether a pixel is red-dominant enough to be re-tinted.
///
/// Both green and blue must be below a fifth of red, so a red channel of
/// zero (or anything under 5) never qualifies.
pub fn is_shadow(pixel: Rgba<u16>) -> bool {
    let [r, g, b, _] = pixel.0;
    r > 0 && g < r / 5 && b < r / 5
}

fn narrow(channel: u16) -> u8 {
    (channel >> 8) as u8
}

fn tint_channel(tint: i32, scale: f64) -> u8 {
    (f64::from(tint) * scale).round().clamp(0.0, 255.0) as u8
}

impl Effect for ShadeConfig {
    fn apply(&self, image: &Rgba16Image) -> ImageShadeResult<RgbaImage> {
        let (width, height) = image.dimensions();
        let mut output = RgbaImage::new(width, height);

        output
            .par_chunks_exact_mut(4)
            .zip(image.as_raw().par_chunks_exact(4))
            .for_each(|(dst, src)| {
                let shaded = self.shade_pixel(Rgba([src[0], src[1], src[2], src[3]]));
                dst.copy_from_slice(&shaded.0);
            });

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    const OPAQUE: u16 = u16::MAX;

    #[test]
    fn test_default_config() {
        let config = ShadeConfig::new();
        assert_eq!((config.r(), config.g(), config.b()), (64, 64, 64));

        let config = ShadeConfig::new().with_r(10).with_b(-3);
        assert_eq!((config.r(), config.g(), config.b()), (10, 64, -3));
    }

    #[test]
    fn test_is_shadow_boundaries() {
        // r / 5 == 100
        assert!(is_shadow(Rgba([500, 99, 99, OPAQUE])));
        assert!(!is_shadow(Rgba([500, 100, 0, OPAQUE])));
        assert!(!is_shadow(Rgba([500, 0, 100, OPAQUE])));

        assert!(!is_shadow(Rgba([0, 0, 0, OPAQUE])));
        // r / 5 rounds down to zero, nothing is below it
        assert!(!is_shadow(Rgba([4, 0, 0, OPAQUE])));
        assert!(is_shadow(Rgba([5, 0, 0, OPAQUE])));
    }

    #[test]
    fn test_pass_through_narrows_channels() {
        let config = ShadeConfig::from_rgb(200, 50, 50);
        let shaded = config.shade_pixel(Rgba([0x1234, 0xabcd, 0xffff, 0x8080]));
        assert_eq!(shaded, Rgba([0x12, 0xab, 0xff, 0x80]));

        let white = config.shade_pixel(Rgba([OPAQUE, OPAQUE, OPAQUE, OPAQUE]));
        assert_eq!(white, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_black_is_never_tinted() {
        let config = ShadeConfig::from_rgb(255, 255, 255);
        let shaded = config.shade_pixel(Rgba([0, 0, 0, OPAQUE]));
        assert_eq!(shaded, Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_full_red_takes_tint() {
        let config = ShadeConfig::from_rgb(200, 50, 50);
        let shaded = config.shade_pixel(Rgba([OPAQUE, 0, 0, OPAQUE]));
        assert_eq!(shaded, Rgba([200, 50, 50, 255]));
    }

    #[test]
    fn test_half_red_takes_half_tint() {
        let config = ShadeConfig::from_rgb(100, 100, 100);
        let shaded = config.shade_pixel(Rgba([32768, 0, 0, 0x4040]));
        assert_eq!(shaded, Rgba([50, 50, 50, 0x40]));
    }

    #[test]
    fn test_tint_is_clamped() {
        let config = ShadeConfig::from_rgb(-10, 300, 1000);
        let shaded = config.shade_pixel(Rgba([OPAQUE, 100, 100, OPAQUE]));
        assert_eq!(shaded, Rgba([0, 255, 255, 255]));
    }

    #[test]
    fn test_apply_preserves_dimensions() {
        let source: Rgba16Image = ImageBuffer::from_fn(3, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([OPAQUE, 0, 0, OPAQUE])
            } else {
                Rgba([0x8000, 0x8000, 0x8000, OPAQUE])
            }
        });

        let config = ShadeConfig::from_rgb(10, 20, 30);
        let output = config.apply(&source).unwrap();
        assert_eq!(output.dimensions(), (3, 2));

        for (x, y, pixel) in output.enumerate_pixels() {
            let expected = if (x + y) % 2 == 0 {
                Rgba([10, 20, 30, 255])
            } else {
                Rgba([0x80, 0x80, 0x80, 255])
            };
            assert_eq!(*pixel, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_apply_empty_image() {
        let source = Rgba16Image::new(0, 0);
        let output = ShadeConfig::new().apply(&source).unwrap();
        assert_eq!(output.dimensions(), (0, 0));
    }
}
