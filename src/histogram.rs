//! Color histogram and unused-color search.
//!
//! The histogram is a presence set over the 24-bit RGB space, stored as a
//! 2 MiB bit set. It is rebuilt on every query (there is no incremental
//! maintenance), which makes the operations that need it the expensive
//! ones in this crate.

use alloc::vec;
use alloc::vec::Vec;

use rgb::Rgb;

use crate::error::{ImageError, Result};
use crate::image::RasterImage;
use crate::trace::trace_event;

const KEY_BITS: u32 = 24;

/// Set of distinct RGB colors present in an image.
pub struct Histogram {
    bits: Vec<u64>,
    distinct: u32,
}

impl Histogram {
    /// Build the presence set for every pixel of `image`.
    pub fn of(image: &RasterImage) -> Self {
        let mut hist = Self {
            bits: vec![0u64; 1 << (KEY_BITS - 6)],
            distinct: 0,
        };
        for px in image.pixels() {
            hist.insert(*px);
        }
        trace_event!("histogram", distinct = hist.distinct);
        hist
    }

    #[inline]
    fn key(color: Rgb<u8>) -> usize {
        (color.r as usize) << 16 | (color.g as usize) << 8 | color.b as usize
    }

    fn insert(&mut self, color: Rgb<u8>) {
        let key = Self::key(color);
        let slot = &mut self.bits[key >> 6];
        let bit = 1u64 << (key & 63);
        if *slot & bit == 0 {
            *slot |= bit;
            self.distinct += 1;
        }
    }

    /// Whether the color occurs anywhere in the source image.
    #[inline]
    pub fn contains(&self, color: Rgb<u8>) -> bool {
        let key = Self::key(color);
        self.bits[key >> 6] & (1u64 << (key & 63)) != 0
    }

    /// Number of distinct colors present.
    #[inline]
    pub fn distinct_colors(&self) -> u32 {
        self.distinct
    }
}

impl RasterImage {
    /// Build the color histogram of this image.
    pub fn histogram(&self) -> Histogram {
        Histogram::of(self)
    }

    /// Find the first color not used anywhere in the image.
    ///
    /// The search starts at `seed`, or `(1, 0, 0)` when not given, and walks
    /// the RGB space with the red component varying fastest, overflowing
    /// into green, then into blue. The returned color is therefore the
    /// smallest unused color at or after the seed in that order.
    ///
    /// Builds the full histogram, so this is a whole-image scan.
    ///
    /// # Errors
    ///
    /// [`ImageError::ColorSpaceExhausted`] when every color from the seed
    /// to `(255, 255, 255)` is in use.
    pub fn find_first_unused_color(&self, seed: Option<Rgb<u8>>) -> Result<Rgb<u8>> {
        let hist = self.histogram();
        let Rgb {
            mut r,
            mut g,
            mut b,
        } = seed.unwrap_or(Rgb { r: 1, g: 0, b: 0 });
        loop {
            let candidate = Rgb { r, g, b };
            if !hist.contains(candidate) {
                return Ok(candidate);
            }
            if r < 255 {
                r += 1;
            } else if g < 255 {
                r = 0;
                g += 1;
            } else if b < 255 {
                r = 0;
                g = 0;
                b += 1;
            } else {
                return Err(ImageError::ColorSpaceExhausted);
            }
        }
    }
}
