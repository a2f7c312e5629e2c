//! Geometric transforms: mirror, rotation, sub-image extraction, paste
//! compositing, and canvas resize without scaling.
//!
//! Transforms that return a new image allocate independently and carry
//! the source's mask, options, and load flags; per-pixel alpha travels
//! with its pixel to the transformed coordinate.

use rgb::Rgb;

use crate::color::round_channel;
use crate::error::{ImageError, Result};
use crate::geom::{Point, Rect, Size};
use crate::image::RasterImage;

/// How [`RasterImage::paste`] combines source pixels with the destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Replace destination pixels outright. Pixels matching the source's
    /// active mask color are skipped, preserving the destination there.
    #[default]
    Overwrite,
    /// Standard source-over compositing using the source's per-pixel
    /// alpha. Overrides mask handling; behaves like [`BlendMode::Overwrite`]
    /// when the source has no alpha channel.
    Compose,
}

impl RasterImage {
    /// Return a mirrored copy: horizontally (each row reversed) or
    /// vertically (rows swapped top-to-bottom).
    pub fn mirror(&self, horizontally: bool) -> RasterImage {
        let mut out = self.derived(self.width, self.height, self.has_alpha());
        let (w, h) = (self.width as usize, self.height as usize);
        for y in 0..h {
            for x in 0..w {
                let (sx, sy) = if horizontally {
                    (w - 1 - x, y)
                } else {
                    (x, h - 1 - y)
                };
                let di = y * w + x;
                let si = sy * w + sx;
                out.rgb[di] = self.rgb[si];
                if let (Some(dst), Some(src)) = (out.alpha.as_mut(), self.alpha.as_ref()) {
                    dst[di] = src[si];
                }
            }
        }
        out
    }

    /// Return a copy rotated 90 degrees in the given direction. The
    /// result's dimensions are swapped relative to the source.
    pub fn rotate90(&self, clockwise: bool) -> RasterImage {
        let mut out = self.derived(self.height, self.width, self.has_alpha());
        let (w, h) = (self.width as usize, self.height as usize);
        // Destination is h wide and w tall.
        for y in 0..w {
            for x in 0..h {
                let (sx, sy) = if clockwise {
                    (y, h - 1 - x)
                } else {
                    (w - 1 - y, x)
                };
                let di = y * h + x;
                let si = sy * w + sx;
                out.rgb[di] = self.rgb[si];
                if let (Some(dst), Some(src)) = (out.alpha.as_mut(), self.alpha.as_ref()) {
                    dst[di] = src[si];
                }
            }
        }
        out
    }

    /// Return a copy rotated by 180 degrees.
    pub fn rotate180(&self) -> RasterImage {
        let mut out = self.derived(self.width, self.height, self.has_alpha());
        let count = self.rgb.len();
        for i in 0..count {
            out.rgb[i] = self.rgb[count - 1 - i];
        }
        if let (Some(dst), Some(src)) = (out.alpha.as_mut(), self.alpha.as_ref()) {
            for i in 0..count {
                dst[i] = src[count - 1 - i];
            }
        }
        out
    }

    /// Copy a rectangular region into a new image of the rectangle's size.
    ///
    /// # Errors
    ///
    /// [`ImageError::RectOutOfBounds`] unless `rect` lies entirely inside
    /// the image.
    pub fn sub_image(&self, rect: Rect) -> Result<RasterImage> {
        if !rect.fits_within(self.width, self.height) {
            return Err(ImageError::RectOutOfBounds {
                x: rect.x,
                y: rect.y,
                rect_width: rect.width,
                rect_height: rect.height,
                width: self.width,
                height: self.height,
            });
        }
        let mut out = self.derived(rect.width, rect.height, self.has_alpha());
        let w = self.width as usize;
        let (rx, ry) = (rect.x as usize, rect.y as usize);
        let (rw, rh) = (rect.width as usize, rect.height as usize);
        for y in 0..rh {
            let src_row = (ry + y) * w + rx;
            let dst_row = y * rw;
            out.rgb[dst_row..dst_row + rw].copy_from_slice(&self.rgb[src_row..src_row + rw]);
            if let (Some(dst), Some(src)) = (out.alpha.as_mut(), self.alpha.as_ref()) {
                dst[dst_row..dst_row + rw].copy_from_slice(&src[src_row..src_row + rw]);
            }
        }
        Ok(out)
    }

    /// Copy `src` into this image with its top-left corner at `(x, y)`,
    /// clipping to the overlap. Negative positions crop the source's top
    /// or left edge.
    ///
    /// See [`BlendMode`] for how pixels combine. Mask state and options of
    /// the destination are unchanged.
    pub fn paste(&mut self, src: &RasterImage, x: i32, y: i32, blend: BlendMode) {
        let dx0 = (x.max(0)) as i64;
        let dy0 = (y.max(0)) as i64;
        let dx1 = (x as i64 + src.width as i64).min(self.width as i64);
        let dy1 = (y as i64 + src.height as i64).min(self.height as i64);
        if dx0 >= dx1 || dy0 >= dy1 {
            return;
        }

        let compose = blend == BlendMode::Compose && src.alpha.is_some();
        let (w, sw) = (self.width as usize, src.width as usize);
        for dy in dy0..dy1 {
            let sy = (dy - y as i64) as usize;
            for dx in dx0..dx1 {
                let sx = (dx - x as i64) as usize;
                let di = dy as usize * w + dx as usize;
                let si = sy * sw + sx;
                if compose {
                    self.compose_pixel(di, src.rgb[si], src.alpha.as_ref().unwrap()[si]);
                } else {
                    if let Some(mask) = src.mask {
                        if src.rgb[si] == mask {
                            continue;
                        }
                    }
                    self.rgb[di] = src.rgb[si];
                    if let Some(alpha) = self.alpha.as_mut() {
                        alpha[di] = src
                            .alpha
                            .as_ref()
                            .map_or(Self::ALPHA_OPAQUE, |a| a[si]);
                    }
                }
            }
        }
    }

    /// Source-over compositing of one straight-alpha pixel onto `di`.
    fn compose_pixel(&mut self, di: usize, src: Rgb<u8>, src_alpha: u8) {
        let sa = src_alpha as f64 / 255.0;
        let dst = self.rgb[di];
        match self.alpha.as_mut() {
            Some(alpha) => {
                let da = alpha[di] as f64 / 255.0;
                let out_a = sa + da * (1.0 - sa);
                if out_a <= 0.0 {
                    alpha[di] = 0;
                    return;
                }
                let blend = |s: u8, d: u8| -> u8 {
                    round_channel((s as f64 * sa + d as f64 * da * (1.0 - sa)) / out_a)
                };
                self.rgb[di] = Rgb {
                    r: blend(src.r, dst.r),
                    g: blend(src.g, dst.g),
                    b: blend(src.b, dst.b),
                };
                alpha[di] = round_channel(out_a * 255.0);
            }
            None => {
                // Opaque destination: classic lerp by source alpha.
                let blend =
                    |s: u8, d: u8| -> u8 { round_channel(s as f64 * sa + d as f64 * (1.0 - sa)) };
                self.rgb[di] = Rgb {
                    r: blend(src.r, dst.r),
                    g: blend(src.g, dst.g),
                    b: blend(src.b, dst.b),
                };
            }
        }
    }

    /// Return this image on a new canvas of `size`, placed at `pos`,
    /// without scaling. Uncovered canvas area is filled with `color`; when
    /// `color` is `None` the current mask color is used, or a fresh unused
    /// color is found and activated as the mask.
    ///
    /// # Errors
    ///
    /// [`ImageError::ColorSpaceExhausted`] when a fill color must be found
    /// and the search comes up empty.
    pub fn size_no_scale(
        &self,
        size: Size,
        pos: Point,
        color: Option<Rgb<u8>>,
    ) -> Result<RasterImage> {
        let (fill, newly_masked) = match color {
            Some(c) => (c, false),
            None => match self.mask {
                Some(mask) => (mask, false),
                None => (self.find_first_unused_color(None)?, true),
            },
        };
        let mut out = self.derived(size.width, size.height, self.has_alpha());
        if newly_masked {
            out.mask = Some(fill);
        }
        out.rgb.fill(fill);
        // Uncovered alpha stays fully transparent; paste fills the rest.
        out.paste(self, pos.x, pos.y, BlendMode::Overwrite);
        Ok(out)
    }

    /// In-place version of [`size_no_scale`](Self::size_no_scale).
    pub fn resize_no_scale(
        &mut self,
        size: Size,
        pos: Point,
        color: Option<Rgb<u8>>,
    ) -> Result<()> {
        *self = self.size_no_scale(size, pos, color)?;
        Ok(())
    }
}
