//! Color transforms: greyscale, mono, disabled dimming, lightness, and
//! HSV adjustments.
//!
//! Channel math conventions, pinned by the tests: weighted greyscale
//! rounds to nearest; lightness and disabled blends truncate (matching
//! the integer casts of the reference blends); HSV conversions round to
//! nearest on the way back to bytes.

use rgb::Rgb;

use crate::image::RasterImage;

/// Default greyscale weights (ITU-R BT.601 luma).
const GREY_WEIGHT_R: f64 = 0.299;
const GREY_WEIGHT_G: f64 = 0.587;
const GREY_WEIGHT_B: f64 = 0.114;

/// Clamp to `[0, 255]` and round half-up. `f64::round` lives in `std`,
/// so this is hand-rolled for the no_std build.
pub(crate) fn round_channel(v: f64) -> u8 {
    let clamped = if v <= 0.0 {
        return 0;
    } else if v >= 255.0 {
        return 255;
    } else {
        v
    };
    let floor = clamped as u8;
    if clamped - floor as f64 >= 0.5 {
        floor + 1
    } else {
        floor
    }
}

/// Blend `fg` toward `bg`: `bg + alpha * (fg - bg)`, clamped and
/// truncated to a byte.
pub(crate) fn blend_channel(fg: u8, bg: u8, alpha: f64) -> u8 {
    let result = bg as f64 + alpha * (fg as f64 - bg as f64);
    if result <= 0.0 {
        0
    } else if result >= 255.0 {
        255
    } else {
        result as u8
    }
}

/// Hue-saturation-value color with every component normalized to `[0, 1]`.
///
/// A hue of `0` is red, `1/3` green, `2/3` blue.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub const fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }

    /// Convert an RGB byte triple to HSV.
    pub fn from_rgb(rgb: Rgb<u8>) -> Self {
        let r = rgb.r as f64 / 255.0;
        let g = rgb.g as f64 / 255.0;
        let b = rgb.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let v = max;
        if delta == 0.0 {
            // Grey has no hue.
            return Self { h: 0.0, s: 0.0, v };
        }

        let mut h = if max == r {
            (g - b) / delta
        } else if max == g {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        h /= 6.0;
        if h < 0.0 {
            h += 1.0;
        }

        Self {
            h,
            s: delta / max,
            v,
        }
    }

    /// Convert back to an RGB byte triple, rounding each channel.
    pub fn to_rgb(self) -> Rgb<u8> {
        if self.s == 0.0 {
            let grey = round_channel(self.v * 255.0);
            return Rgb {
                r: grey,
                g: grey,
                b: grey,
            };
        }

        let hue = self.h * 6.0; // sector 0 to 5
        let sector = hue as u32;
        let f = hue - sector as f64;
        let p = self.v * (1.0 - self.s);
        let q = self.v * (1.0 - self.s * f);
        let t = self.v * (1.0 - self.s * (1.0 - f));

        let (r, g, b) = match sector {
            0 => (self.v, t, p),
            1 => (q, self.v, p),
            2 => (p, self.v, t),
            3 => (p, q, self.v),
            4 => (t, p, self.v),
            _ => (self.v, p, q),
        };

        Rgb {
            r: round_channel(r * 255.0),
            g: round_channel(g * 255.0),
            b: round_channel(b * 255.0),
        }
    }
}

/// Fractional part mapped into `[0, 1)`, correct for negative inputs.
fn wrap_unit(v: f64) -> f64 {
    let f = v - (v as i64 as f64);
    if f < 0.0 { f + 1.0 } else { f }
}

impl RasterImage {
    /// Turn every pixel grey in place using the given channel weights:
    /// all three channels become `round(r*wr + g*wg + b*wb)`.
    pub fn change_to_greyscale_weighted(&mut self, wr: f64, wg: f64, wb: f64) {
        self.map_pixels(|px| {
            let luma =
                round_channel(px.r as f64 * wr + px.g as f64 * wg + px.b as f64 * wb);
            *px = Rgb {
                r: luma,
                g: luma,
                b: luma,
            };
        });
        // Keep the mask color meaningful by greying it the same way.
        if let Some(mask) = self.mask {
            let luma = round_channel(
                mask.r as f64 * wr + mask.g as f64 * wg + mask.b as f64 * wb,
            );
            self.mask = Some(Rgb {
                r: luma,
                g: luma,
                b: luma,
            });
        }
    }

    /// Turn every pixel grey in place using ITU-R BT.601 luma weights.
    pub fn change_to_greyscale(&mut self) {
        self.change_to_greyscale_weighted(GREY_WEIGHT_R, GREY_WEIGHT_G, GREY_WEIGHT_B);
    }

    /// Return a greyscale copy using the given channel weights.
    pub fn convert_to_greyscale_weighted(&self, wr: f64, wg: f64, wb: f64) -> RasterImage {
        let mut out = self.clone();
        out.change_to_greyscale_weighted(wr, wg, wb);
        out
    }

    /// Return a greyscale copy using ITU-R BT.601 luma weights.
    pub fn convert_to_greyscale(&self) -> RasterImage {
        self.convert_to_greyscale_weighted(GREY_WEIGHT_R, GREY_WEIGHT_G, GREY_WEIGHT_B)
    }

    /// Return a monochrome copy: white where the pixel equals `color`
    /// exactly, black everywhere else. Alpha and mask are dropped; the
    /// result is a pure two-color shape image.
    pub fn convert_to_mono(&self, color: Rgb<u8>) -> RasterImage {
        let mut out = self.clone();
        out.alpha = None;
        out.mask = None;
        out.map_pixels(|px| {
            let v = if *px == color { 255 } else { 0 };
            *px = Rgb { r: v, g: v, b: v };
        });
        out
    }

    /// Darken or lighten every pixel in place. `ialpha` ranges over
    /// `[0, 200]`: `0` maps to black, `100` is the identity, `200` maps
    /// to white; values between interpolate linearly toward the nearer
    /// extreme.
    pub fn change_lightness(&mut self, ialpha: i32) {
        let ialpha = ialpha.clamp(0, 200);
        if ialpha == 100 {
            return;
        }
        let (bg, alpha) = if ialpha > 100 {
            // Blend with white.
            (255u8, 1.0 - (ialpha as f64 - 100.0) / 100.0)
        } else {
            // Blend with black.
            (0u8, ialpha as f64 / 100.0)
        };
        self.map_pixels(|px| {
            px.r = blend_channel(px.r, bg, alpha);
            px.g = blend_channel(px.g, bg, alpha);
            px.b = blend_channel(px.b, bg, alpha);
        });
    }

    /// Return a lightness-adjusted copy; see
    /// [`change_lightness`](Self::change_lightness).
    pub fn convert_lightness(&self, ialpha: i32) -> RasterImage {
        let mut out = self.clone();
        out.change_lightness(ialpha);
        out
    }

    /// Dim every pixel in place toward `brightness`, keeping 0.4 of the
    /// original channel: `c' = brightness + 0.4 * (c - brightness)`.
    pub fn change_to_disabled(&mut self, brightness: u8) {
        self.map_pixels(|px| {
            px.r = blend_channel(px.r, brightness, 0.4);
            px.g = blend_channel(px.g, brightness, 0.4);
            px.b = blend_channel(px.b, brightness, 0.4);
        });
    }

    /// Return a disabled (dimmed) copy; see
    /// [`change_to_disabled`](Self::change_to_disabled).
    pub fn convert_to_disabled(&self, brightness: u8) -> RasterImage {
        let mut out = self.clone();
        out.change_to_disabled(brightness);
        out
    }

    /// Rotate the hue of every pixel. `angle` ranges over `[-1, 1]`,
    /// where `-1` is -360 degrees and `1` is +360 degrees.
    pub fn rotate_hue(&mut self, angle: f64) {
        if angle == 0.0 {
            return;
        }
        self.map_pixels(|px| {
            let mut hsv = Hsv::from_rgb(*px);
            hsv.h = wrap_unit(hsv.h + angle);
            *px = hsv.to_rgb();
        });
    }

    /// Shift the saturation of every pixel. `factor` ranges over
    /// `[-1, 1]`: -1 fully desaturates, +1 fully saturates.
    pub fn change_saturation(&mut self, factor: f64) {
        if factor == 0.0 {
            return;
        }
        self.map_pixels(|px| {
            let mut hsv = Hsv::from_rgb(*px);
            hsv.s = (hsv.s + factor).clamp(0.0, 1.0);
            *px = hsv.to_rgb();
        });
    }

    /// Shift the brightness (HSV value) of every pixel. `factor` ranges
    /// over `[-1, 1]`.
    pub fn change_brightness(&mut self, factor: f64) {
        if factor == 0.0 {
            return;
        }
        self.map_pixels(|px| {
            let mut hsv = Hsv::from_rgb(*px);
            hsv.v = (hsv.v + factor).clamp(0.0, 1.0);
            *px = hsv.to_rgb();
        });
    }

    /// Adjust hue, saturation, and brightness of every pixel in one pass.
    /// Parameter ranges match [`rotate_hue`](Self::rotate_hue),
    /// [`change_saturation`](Self::change_saturation), and
    /// [`change_brightness`](Self::change_brightness).
    pub fn change_hsv(&mut self, angle: f64, sat_factor: f64, val_factor: f64) {
        self.map_pixels(|px| {
            let mut hsv = Hsv::from_rgb(*px);
            hsv.h = wrap_unit(hsv.h + angle);
            hsv.s = (hsv.s + sat_factor).clamp(0.0, 1.0);
            hsv.v = (hsv.v + val_factor).clamp(0.0, 1.0);
            *px = hsv.to_rgb();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const RED: Rgb<u8> = Rgb { r: 255, g: 0, b: 0 };
    const GREEN: Rgb<u8> = Rgb { r: 0, g: 255, b: 0 };
    const BLUE: Rgb<u8> = Rgb { r: 0, g: 0, b: 255 };
    const WHITE: Rgb<u8> = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    const BLACK: Rgb<u8> = Rgb { r: 0, g: 0, b: 0 };

    fn random_image(width: u32, height: u32) -> RasterImage {
        let mut rng = rand::rng();
        let mut image = RasterImage::with_size(width, height);
        for px in image.pixels_mut() {
            *px = Rgb {
                r: rng.random(),
                g: rng.random(),
                b: rng.random(),
            };
        }
        image
    }

    #[test]
    fn greyscale_makes_channels_equal() {
        let mut image = random_image(6, 4);
        image.change_to_greyscale();
        for px in image.pixels() {
            assert_eq!(px.r, px.g);
            assert_eq!(px.g, px.b);
        }
    }

    #[test]
    fn greyscale_default_weights() {
        let mut image = RasterImage::with_size(1, 1);
        image.set_rgb(0, 0, RED).unwrap();
        let grey = image.convert_to_greyscale();
        // round(255 * 0.299) = 76
        assert_eq!(grey.rgb_at(0, 0).unwrap(), Rgb { r: 76, g: 76, b: 76 });
        // The original is untouched.
        assert_eq!(image.rgb_at(0, 0).unwrap(), RED);
    }

    #[test]
    fn greyscale_custom_weights() {
        let mut image = RasterImage::with_size(1, 1);
        image.set_rgb(0, 0, Rgb { r: 100, g: 200, b: 50 }).unwrap();
        image.change_to_greyscale_weighted(1.0, 0.0, 0.0);
        assert_eq!(
            image.rgb_at(0, 0).unwrap(),
            Rgb {
                r: 100,
                g: 100,
                b: 100
            }
        );
    }

    #[test]
    fn greyscale_greys_the_mask_color() {
        let mut image = RasterImage::with_size(1, 1);
        image.set_mask_color(RED);
        image.change_to_greyscale();
        assert_eq!(image.mask_color(), Some(Rgb { r: 76, g: 76, b: 76 }));
    }

    #[test]
    fn mono_white_on_match_black_elsewhere() {
        let mut image = RasterImage::with_size(2, 1);
        image.set_rgb(0, 0, RED).unwrap();
        image.set_rgb(1, 0, BLUE).unwrap();
        let mono = image.convert_to_mono(RED);
        assert_eq!(mono.rgb_at(0, 0).unwrap(), WHITE);
        assert_eq!(mono.rgb_at(1, 0).unwrap(), BLACK);
        assert!(!mono.has_alpha());
        assert!(!mono.has_mask());
    }

    #[test]
    fn lightness_boundaries() {
        let mut to_black = random_image(3, 3);
        to_black.change_lightness(0);
        assert!(to_black.pixels().iter().all(|&px| px == BLACK));

        let mut to_white = random_image(3, 3);
        to_white.change_lightness(200);
        assert!(to_white.pixels().iter().all(|&px| px == WHITE));

        let identity = random_image(3, 3);
        assert_eq!(identity.convert_lightness(100), identity);
    }

    #[test]
    fn lightness_interpolates() {
        let mut image = RasterImage::with_size(1, 1);
        image
            .set_rgb(0, 0, Rgb {
                r: 100,
                g: 100,
                b: 100,
            })
            .unwrap();
        // 150 is halfway toward white: 255 + 0.5 * (100 - 255) = 177.5,
        // truncated.
        let lighter = image.convert_lightness(150);
        assert_eq!(
            lighter.rgb_at(0, 0).unwrap(),
            Rgb {
                r: 177,
                g: 177,
                b: 177
            }
        );
        // 50 is halfway toward black.
        let darker = image.convert_lightness(50);
        assert_eq!(darker.rgb_at(0, 0).unwrap(), Rgb { r: 50, g: 50, b: 50 });
    }

    #[test]
    fn lightness_clamps_range() {
        let mut image = random_image(2, 2);
        let mut beyond = image.clone();
        image.change_lightness(0);
        beyond.change_lightness(-40);
        assert_eq!(image, beyond);
    }

    #[test]
    fn disabled_blend_is_pinned() {
        let mut image = RasterImage::with_size(1, 1);
        image.set_rgb(0, 0, BLACK).unwrap();
        image.change_to_disabled(255);
        // 255 + 0.4 * (0 - 255) = 153
        assert_eq!(
            image.rgb_at(0, 0).unwrap(),
            Rgb {
                r: 153,
                g: 153,
                b: 153
            }
        );

        let mut white = RasterImage::with_size(1, 1);
        white.set_rgb(0, 0, WHITE).unwrap();
        let dimmed = white.convert_to_disabled(0);
        // 0 + 0.4 * 255 = 102
        assert_eq!(
            dimmed.rgb_at(0, 0).unwrap(),
            Rgb {
                r: 102,
                g: 102,
                b: 102
            }
        );
    }

    #[test]
    fn hsv_primary_round_trips() {
        for color in [RED, GREEN, BLUE, WHITE, BLACK] {
            assert_eq!(Hsv::from_rgb(color).to_rgb(), color);
        }
    }

    #[test]
    fn hsv_random_round_trips_closely() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let color = Rgb {
                r: rng.random(),
                g: rng.random(),
                b: rng.random(),
            };
            let back = Hsv::from_rgb(color).to_rgb();
            assert!(
                (back.r as i16 - color.r as i16).abs() <= 1
                    && (back.g as i16 - color.g as i16).abs() <= 1
                    && (back.b as i16 - color.b as i16).abs() <= 1,
                "{color:?} -> {back:?}"
            );
        }
    }

    #[test]
    fn hue_rotation_by_a_third_cycles_primaries() {
        let mut image = RasterImage::with_size(3, 1);
        image.set_rgb(0, 0, RED).unwrap();
        image.set_rgb(1, 0, GREEN).unwrap();
        image.set_rgb(2, 0, BLUE).unwrap();
        image.rotate_hue(1.0 / 3.0);
        assert_eq!(image.rgb_at(0, 0).unwrap(), GREEN);
        assert_eq!(image.rgb_at(1, 0).unwrap(), BLUE);
        assert_eq!(image.rgb_at(2, 0).unwrap(), RED);
    }

    #[test]
    fn negative_hue_rotation_wraps() {
        let mut image = RasterImage::with_size(1, 1);
        image.set_rgb(0, 0, RED).unwrap();
        image.rotate_hue(-1.0 / 3.0);
        assert_eq!(image.rgb_at(0, 0).unwrap(), BLUE);
    }

    #[test]
    fn full_rotation_is_identity() {
        let image = random_image(4, 4);
        let mut rotated = image.clone();
        rotated.rotate_hue(1.0);
        assert_eq!(rotated, image);
    }

    #[test]
    fn desaturation_greys_out() {
        let mut image = RasterImage::with_size(1, 1);
        image.set_rgb(0, 0, RED).unwrap();
        image.change_saturation(-1.0);
        assert_eq!(image.rgb_at(0, 0).unwrap(), WHITE);
    }

    #[test]
    fn brightness_extremes() {
        let mut image = random_image(2, 2);
        image.change_brightness(-1.0);
        assert!(image.pixels().iter().all(|&px| px == BLACK));

        let mut white = RasterImage::with_size(1, 1);
        white.set_rgb(0, 0, Rgb { r: 10, g: 10, b: 10 }).unwrap();
        white.change_brightness(1.0);
        assert_eq!(white.rgb_at(0, 0).unwrap(), WHITE);
    }

    #[test]
    fn change_hsv_combines_all_three() {
        let mut image = RasterImage::with_size(1, 1);
        image.set_rgb(0, 0, RED).unwrap();
        let mut stepwise = image.clone();
        stepwise.rotate_hue(1.0 / 3.0);
        stepwise.change_saturation(-0.25);
        stepwise.change_brightness(-0.25);

        image.change_hsv(1.0 / 3.0, -0.25, -0.25);
        // One-pass and stepwise application agree within rounding.
        let a = image.rgb_at(0, 0).unwrap();
        let b = stepwise.rgb_at(0, 0).unwrap();
        assert!(
            (a.r as i16 - b.r as i16).abs() <= 2
                && (a.g as i16 - b.g as i16).abs() <= 2
                && (a.b as i16 - b.b as i16).abs() <= 2
        );
    }

    #[test]
    fn round_channel_behavior() {
        assert_eq!(round_channel(-3.0), 0);
        assert_eq!(round_channel(0.49), 0);
        assert_eq!(round_channel(0.5), 1);
        assert_eq!(round_channel(254.5), 255);
        assert_eq!(round_channel(300.0), 255);
    }

    #[test]
    fn blend_channel_truncates() {
        // 255 + 0.5 * (100 - 255) = 177.5 -> 177
        assert_eq!(blend_channel(100, 255, 0.5), 177);
        assert_eq!(blend_channel(100, 0, 0.0), 0);
        assert_eq!(blend_channel(100, 0, 1.0), 100);
    }
}
