//! Brightness / contrast remapping of 8-bit pixel data.
//!
//! Both adjustments are affine maps `v * alpha + gamma` evaluated in `f32`,
//! rounded half-to-even and saturated to `[0, 255]`, applied independently to
//! every channel sample:
//!
//! * **brightness** `b`: `shadow = max(b, 0)`, `highlight = 255 + min(b, 0)`,
//!   `alpha = (highlight - shadow) / 255`, `gamma = shadow`.
//! * **contrast** `c`: `f = 131 (c + 127) / (127 (131 - c))`, `alpha = f`,
//!   `gamma = 127 (1 - f)`, applied to the brightness-adjusted value.
//!
//! Because each step depends on nothing but the input sample, the two steps
//! are folded into a single 256-entry lookup table.

use crate::error::ImagesToPdfError;
use image::{ImageBuffer, Pixel};

/// Smallest accepted brightness or contrast value.
pub const MIN_LEVEL: i32 = -255;
/// Largest accepted brightness or contrast value.
pub const MAX_LEVEL: i32 = 255;
/// The contrast factor's denominator is zero at this value.
pub const SINGULAR_CONTRAST: i32 = 131;

/// A validated brightness/contrast pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tone {
    brightness: i32,
    contrast: i32,
}

impl Tone {
    /// Validate and build a tone adjustment.
    ///
    /// # Errors
    /// [`ImagesToPdfError::InvalidTone`] when either value is outside
    /// `[-255, 255]`, or when `contrast == 131`.
    pub fn new(brightness: i32, contrast: i32) -> Result<Self, ImagesToPdfError> {
        for (name, value) in [("brightness", brightness), ("contrast", contrast)] {
            if !(MIN_LEVEL..=MAX_LEVEL).contains(&value) {
                return Err(ImagesToPdfError::InvalidTone(format!(
                    "{name} must be {MIN_LEVEL}–{MAX_LEVEL}, got {value}"
                )));
            }
        }
        if contrast == SINGULAR_CONTRAST {
            return Err(ImagesToPdfError::InvalidTone(format!(
                "contrast {SINGULAR_CONTRAST} is undefined (division by zero); use 130 or 132"
            )));
        }
        Ok(Self {
            brightness,
            contrast,
        })
    }

    pub fn brightness(&self) -> i32 {
        self.brightness
    }

    pub fn contrast(&self) -> i32 {
        self.contrast
    }

    /// True when applying this tone leaves every sample unchanged.
    pub fn is_identity(&self) -> bool {
        self.brightness == 0 && self.contrast == 0
    }

    /// Build the 256-entry sample map for this tone.
    pub fn lookup_table(&self) -> [u8; 256] {
        let brightness = brightness_coefficients(self.brightness);
        let contrast = contrast_coefficients(self.contrast);

        let mut table = [0u8; 256];
        for (v, slot) in table.iter_mut().enumerate() {
            let mut s = v as u8;
            if let Some((alpha, gamma)) = brightness {
                s = weighted(s, alpha, gamma);
            }
            if let Some((alpha, gamma)) = contrast {
                s = weighted(s, alpha, gamma);
            }
            *slot = s;
        }
        table
    }

    /// Remap every sample of `samples` in place.
    pub fn apply_in_place(&self, samples: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        let table = self.lookup_table();
        for s in samples.iter_mut() {
            *s = table[*s as usize];
        }
    }

    /// Return an adjusted copy of `buffer` with the same dimensions and
    /// pixel layout. The input is left untouched.
    pub fn adjust<P>(&self, buffer: &ImageBuffer<P, Vec<u8>>) -> ImageBuffer<P, Vec<u8>>
    where
        P: Pixel<Subpixel = u8>,
    {
        let mut out = buffer.clone();
        self.apply_in_place(&mut out);
        out
    }
}

/// `(alpha, gamma)` for a brightness step, `None` when `brightness == 0`.
fn brightness_coefficients(brightness: i32) -> Option<(f32, f32)> {
    if brightness == 0 {
        return None;
    }
    let shadow = brightness.max(0);
    let highlight = 255 + brightness.min(0);
    let alpha = f64::from(highlight - shadow) / 255.0;
    Some((alpha as f32, shadow as f32))
}

/// `(alpha, gamma)` for a contrast step, `None` when `contrast == 0`.
fn contrast_coefficients(contrast: i32) -> Option<(f32, f32)> {
    if contrast == 0 {
        return None;
    }
    let f = 131.0 * f64::from(contrast + 127) / (127.0 * f64::from(131 - contrast));
    Some((f as f32, (127.0 * (1.0 - f)) as f32))
}

fn weighted(sample: u8, alpha: f32, gamma: f32) -> u8 {
    let v = (f32::from(sample) * alpha + gamma).round_ties_even();
    v.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn at(tone: Tone, samples: &[u8]) -> Vec<u8> {
        let table = tone.lookup_table();
        samples.iter().map(|&s| table[s as usize]).collect()
    }

    const PROBES: [u8; 6] = [0, 10, 100, 128, 200, 255];

    #[test]
    fn zero_parameters_are_identity() {
        let tone = Tone::new(0, 0).unwrap();
        assert!(tone.is_identity());

        let img = RgbImage::from_fn(7, 5, |x, y| Rgb([x as u8 * 30, y as u8 * 50, 255]));
        assert_eq!(tone.adjust(&img), img);
        let table = tone.lookup_table();
        assert!(table.iter().enumerate().all(|(i, &v)| i as u8 == v));
    }

    #[test]
    fn positive_brightness() {
        let tone = Tone::new(50, 0).unwrap();
        assert_eq!(at(tone, &PROBES), vec![50, 58, 130, 153, 211, 255]);
    }

    #[test]
    fn negative_brightness() {
        let tone = Tone::new(-50, 0).unwrap();
        assert_eq!(at(tone, &PROBES), vec![0, 8, 80, 103, 161, 205]);
    }

    #[test]
    fn extreme_brightness_saturates() {
        assert_eq!(at(Tone::new(255, 0).unwrap(), &PROBES), vec![255; 6]);
        assert_eq!(at(Tone::new(-255, 0).unwrap(), &PROBES), vec![0; 6]);
    }

    #[test]
    fn positive_contrast() {
        let tone = Tone::new(0, 64).unwrap();
        assert_eq!(at(tone, &PROBES), vec![0, 0, 48, 130, 255, 255]);
    }

    #[test]
    fn negative_contrast() {
        let tone = Tone::new(0, -64).unwrap();
        assert_eq!(at(tone, &PROBES), vec![85, 88, 118, 127, 151, 170]);
    }

    #[test]
    fn contrast_above_singularity_inverts() {
        let tone = Tone::new(0, 200).unwrap();
        assert_eq!(at(tone, &PROBES), vec![255, 255, 255, 122, 0, 0]);
    }

    #[test]
    fn brightness_then_contrast() {
        let tone = Tone::new(30, 40).unwrap();
        assert_eq!(at(tone, &PROBES), vec![0, 0, 110, 157, 255, 255]);
    }

    #[test]
    fn uniform_buffer_brightness_50() {
        let img = GrayImage::from_pixel(4, 4, Luma([100]));
        let out = Tone::new(50, 0).unwrap().adjust(&img);
        assert_eq!(out.dimensions(), (4, 4));
        assert!(out.pixels().all(|p| p.0 == [130]));
    }

    #[test]
    fn adjusts_every_channel_independently() {
        let img = RgbImage::from_pixel(2, 2, Rgb([0, 100, 255]));
        let out = Tone::new(50, 0).unwrap().adjust(&img);
        assert!(out.pixels().all(|p| p.0 == [50, 130, 255]));
        // source untouched
        assert!(img.pixels().all(|p| p.0 == [0, 100, 255]));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            Tone::new(256, 0),
            Err(ImagesToPdfError::InvalidTone(_))
        ));
        assert!(matches!(
            Tone::new(0, -256),
            Err(ImagesToPdfError::InvalidTone(_))
        ));
        assert!(Tone::new(-255, 255).is_ok());
    }

    #[test]
    fn rejects_singular_contrast() {
        let err = Tone::new(0, SINGULAR_CONTRAST).unwrap_err();
        assert!(err.to_string().contains("131"), "got: {err}");
        assert!(Tone::new(0, 130).is_ok());
        assert!(Tone::new(0, 132).is_ok());
    }
}
