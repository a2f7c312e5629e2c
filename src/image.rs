//! Core pixel buffer type.
//!
//! [`RasterImage`] owns row-major RGB storage plus an optional alpha plane
//! and an optional mask color. All transform engines operate on it; the
//! codec provider boundary fills and drains it.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use imgref::{Img, ImgRef, ImgRefMut, ImgVec};
use rgb::ComponentBytes;
use rgb::{Rgb, Rgba};

use crate::codec::LoadFlags;
use crate::error::{ImageError, Result};
use crate::format::ImageFormat;
use crate::geom::{Rect, Size};
use crate::options::ImageOptions;

/// Platform-independent raster image: RGB pixels, optional alpha plane,
/// optional mask color, and opaque codec options.
///
/// Storage is row-major, top-to-bottom, left-to-right, exactly
/// `width * height` pixels. The alpha plane, when present, has the same
/// length and layout. A `0x0` image is the "empty" state; [`is_ok`]
/// reports non-emptiness.
///
/// A `RasterImage` is exclusively owned: operations mutate in place or
/// return an independent new image, never share storage. For zero-copy
/// reads use the scoped [`view`](Self::view) / [`view_mut`](Self::view_mut)
/// borrows.
///
/// [`is_ok`]: Self::is_ok
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgb: Vec<Rgb<u8>>,
    pub(crate) alpha: Option<Vec<u8>>,
    pub(crate) mask: Option<Rgb<u8>>,
    pub(crate) options: ImageOptions,
    pub(crate) format: Option<ImageFormat>,
    pub(crate) load_flags: LoadFlags,
}

impl RasterImage {
    /// Alpha value conventionally meaning complete transparency.
    pub const ALPHA_TRANSPARENT: u8 = 0;

    /// Default threshold separating transparent from opaque pixels.
    pub const ALPHA_THRESHOLD: u8 = 0x80;

    /// Alpha value conventionally meaning complete opacity.
    pub const ALPHA_OPAQUE: u8 = 0xFF;

    /// Create the empty image (zero dimensions, no pixel data).
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            rgb: Vec::new(),
            alpha: None,
            mask: None,
            options: ImageOptions::new(),
            format: None,
            load_flags: LoadFlags::default(),
        }
    }

    /// Create a black image of the given size, without an alpha channel.
    pub fn with_size(width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            rgb: vec![Rgb { r: 0, g: 0, b: 0 }; count],
            alpha: None,
            mask: None,
            options: ImageOptions::new(),
            format: None,
            load_flags: LoadFlags::default(),
        }
    }

    /// Wrap an owned pixel vec as an image.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidArgument`] if the vec length is not exactly
    /// `width * height`.
    pub fn from_pixels(width: u32, height: u32, rgb: Vec<Rgb<u8>>) -> Result<Self> {
        if rgb.len() != width as usize * height as usize {
            return Err(ImageError::InvalidArgument(
                "pixel buffer length must equal width * height",
            ));
        }
        Ok(Self {
            width,
            height,
            rgb,
            alpha: None,
            mask: None,
            options: ImageOptions::new(),
            format: None,
            load_flags: LoadFlags::default(),
        })
    }

    /// Wrap owned pixel and alpha vecs as an image.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidArgument`] if either vec length is not exactly
    /// `width * height`.
    pub fn from_pixels_alpha(
        width: u32,
        height: u32,
        rgb: Vec<Rgb<u8>>,
        alpha: Vec<u8>,
    ) -> Result<Self> {
        if alpha.len() != width as usize * height as usize {
            return Err(ImageError::InvalidArgument(
                "alpha buffer length must equal width * height",
            ));
        }
        let mut image = Self::from_pixels(width, height, rgb)?;
        image.alpha = Some(alpha);
        Ok(image)
    }

    /// Wrap an owned byte vec of packed `r g b` triples as an image.
    ///
    /// Reuses the allocation when the vec's capacity permits, otherwise
    /// copies once.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidArgument`] if the length is not exactly
    /// `width * height * 3`.
    pub fn from_raw_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != width as usize * height as usize * 3 {
            return Err(ImageError::InvalidArgument(
                "byte buffer length must equal width * height * 3",
            ));
        }
        let rgb = match bytemuck::allocation::try_cast_vec::<u8, Rgb<u8>>(bytes) {
            Ok(rgb) => rgb,
            // Capacity not divisible by the pixel size; copy instead.
            Err((_, bytes)) => bytes
                .chunks_exact(3)
                .map(|c| Rgb {
                    r: c[0],
                    g: c[1],
                    b: c[2],
                })
                .collect(),
        };
        Self::from_pixels(width, height, rgb)
    }

    /// Copy a borrowed view into a new owned image.
    pub fn from_view(view: ImgRef<'_, Rgb<u8>>) -> Self {
        let (buf, width, height) = view.to_contiguous_buf();
        Self {
            width: width as u32,
            height: height as u32,
            rgb: buf.into_owned(),
            alpha: None,
            mask: None,
            options: ImageOptions::new(),
            format: None,
            load_flags: LoadFlags::default(),
        }
    }

    // Accessors ---------------------------------------------------------------

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Image dimensions.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bounds rectangle: `(0, 0, width, height)`.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Total pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.rgb.len()
    }

    /// Whether pixel data is present (both dimensions non-zero).
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// The pixel storage, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Rgb<u8>] {
        &self.rgb
    }

    /// Mutable pixel storage, row-major.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgb<u8>] {
        &mut self.rgb
    }

    /// The alpha plane, if present.
    #[inline]
    pub fn alpha_data(&self) -> Option<&[u8]> {
        self.alpha.as_deref()
    }

    /// Mutable alpha plane, if present.
    #[inline]
    pub fn alpha_data_mut(&mut self) -> Option<&mut [u8]> {
        self.alpha.as_deref_mut()
    }

    /// Pixel storage as packed `r g b` bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.rgb.as_bytes()
    }

    /// Borrowed 2D view of the pixels.
    pub fn view(&self) -> ImgRef<'_, Rgb<u8>> {
        Img::new(self.rgb.as_slice(), self.width as usize, self.height as usize)
    }

    /// Mutable borrowed 2D view of the pixels.
    pub fn view_mut(&mut self) -> ImgRefMut<'_, Rgb<u8>> {
        Img::new(
            self.rgb.as_mut_slice(),
            self.width as usize,
            self.height as usize,
        )
    }

    /// Consume the image and return the pixel data as an [`ImgVec`].
    ///
    /// Alpha, mask, and options are dropped; use the accessors first if
    /// they are needed.
    pub fn into_pixels(self) -> ImgVec<Rgb<u8>> {
        Img::new(self.rgb, self.width as usize, self.height as usize)
    }

    /// The options attached to this image.
    #[inline]
    pub fn options(&self) -> &ImageOptions {
        &self.options
    }

    /// Mutable access to the attached options.
    #[inline]
    pub fn options_mut(&mut self) -> &mut ImageOptions {
        &mut self.options
    }

    /// Flags used for loads performed through this image.
    #[inline]
    pub fn load_flags(&self) -> LoadFlags {
        self.load_flags
    }

    /// Set the flags used for future loads performed through this image.
    #[inline]
    pub fn set_load_flags(&mut self, flags: LoadFlags) {
        self.load_flags = flags;
    }

    /// The container format this image was decoded from, or the one set
    /// for a future save.
    #[inline]
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Tag the image with a container format.
    #[inline]
    pub fn set_format(&mut self, format: Option<ImageFormat>) {
        self.format = format;
    }

    // Bounds checking ---------------------------------------------------------

    #[inline]
    pub(crate) fn offset(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(ImageError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    // Pixel access ------------------------------------------------------------

    /// RGB color at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`ImageError::OutOfBounds`] when the coordinate is outside the image.
    pub fn rgb_at(&self, x: u32, y: u32) -> Result<Rgb<u8>> {
        let i = self.offset(x, y)?;
        Ok(self.rgb[i])
    }

    /// Set the RGB color at `(x, y)`. Alpha is untouched.
    pub fn set_rgb(&mut self, x: u32, y: u32, color: Rgb<u8>) -> Result<()> {
        let i = self.offset(x, y)?;
        self.rgb[i] = color;
        Ok(())
    }

    /// Set the RGB color of every pixel in `rect`, or of the whole image
    /// when `rect` is `None`. Alpha is untouched.
    ///
    /// # Errors
    ///
    /// [`ImageError::RectOutOfBounds`] unless the rectangle lies entirely
    /// inside the image.
    pub fn set_rgb_rect(&mut self, rect: Option<Rect>, color: Rgb<u8>) -> Result<()> {
        let rect = match rect {
            None => self.bounds(),
            Some(rect) => {
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
                rect
            }
        };
        let width = self.width as usize;
        for y in rect.y as usize..rect.bottom() as usize {
            let row = y * width;
            self.rgb[row + rect.x as usize..row + rect.right() as usize].fill(color);
        }
        Ok(())
    }

    /// Color at `(x, y)` including alpha.
    ///
    /// With `with_alpha = false`, or when the image has no alpha channel,
    /// the returned alpha is [`ALPHA_OPAQUE`](Self::ALPHA_OPAQUE). The mask
    /// color is not consulted; use [`is_transparent`](Self::is_transparent)
    /// for transparency queries.
    pub fn pixel_at(&self, x: u32, y: u32, with_alpha: bool) -> Result<Rgba<u8>> {
        let i = self.offset(x, y)?;
        let Rgb { r, g, b } = self.rgb[i];
        let a = if with_alpha {
            self.alpha.as_ref().map_or(Self::ALPHA_OPAQUE, |a| a[i])
        } else {
            Self::ALPHA_OPAQUE
        };
        Ok(Rgba { r, g, b, a })
    }

    /// Set the color at `(x, y)`.
    ///
    /// With `with_alpha = true` the alpha component is written to the alpha
    /// plane when one exists; with `with_alpha = false` (or without an
    /// alpha channel) any stored alpha is left untouched.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>, with_alpha: bool) -> Result<()> {
        let i = self.offset(x, y)?;
        self.rgb[i] = Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        };
        if with_alpha {
            if let Some(alpha) = self.alpha.as_mut() {
                alpha[i] = color.a;
            }
        }
        Ok(())
    }

    /// Red intensity at `(x, y)`.
    pub fn red_at(&self, x: u32, y: u32) -> Result<u8> {
        Ok(self.rgb[self.offset(x, y)?].r)
    }

    /// Green intensity at `(x, y)`.
    pub fn green_at(&self, x: u32, y: u32) -> Result<u8> {
        Ok(self.rgb[self.offset(x, y)?].g)
    }

    /// Blue intensity at `(x, y)`.
    pub fn blue_at(&self, x: u32, y: u32) -> Result<u8> {
        Ok(self.rgb[self.offset(x, y)?].b)
    }

    // Whole-buffer operations -------------------------------------------------

    /// Fill every RGB channel of every pixel with `value`. The alpha
    /// plane, mask, and options are untouched.
    pub fn clear(&mut self, value: u8) {
        self.rgb.fill(Rgb {
            r: value,
            g: value,
            b: value,
        });
    }

    /// Recreate the image at the given size, black-filled, dropping alpha,
    /// mask, and options. Load flags persist for reuse by later loads.
    pub fn reset(&mut self, width: u32, height: u32) {
        let count = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.rgb.clear();
        self.rgb.resize(count, Rgb { r: 0, g: 0, b: 0 });
        self.alpha = None;
        self.mask = None;
        self.options = ImageOptions::new();
        self.format = None;
    }

    /// Destroy the pixel data; the image becomes empty (`0x0`).
    pub fn reset_empty(&mut self) {
        self.reset(0, 0);
        self.rgb.shrink_to_fit();
    }

    /// Replace every occurrence of one RGB color with another. Alpha is
    /// untouched.
    pub fn replace(&mut self, old: Rgb<u8>, new: Rgb<u8>) {
        for px in &mut self.rgb {
            if *px == old {
                *px = new;
            }
        }
    }

    /// Run `f` over every pixel.
    pub fn map_pixels<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Rgb<u8>),
    {
        for px in &mut self.rgb {
            f(px);
        }
    }

    /// Run `f` over every visible pixel: mask-colored pixels are skipped
    /// when a mask is active, otherwise fully transparent pixels are
    /// skipped when an alpha channel is present.
    pub fn map_opaque_pixels<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Rgb<u8>),
    {
        if let Some(mask) = self.mask {
            for px in &mut self.rgb {
                if *px != mask {
                    f(px);
                }
            }
        } else if let Some(alpha) = self.alpha.as_ref() {
            for (px, &a) in self.rgb.iter_mut().zip(alpha.iter()) {
                if a != Self::ALPHA_TRANSPARENT {
                    f(px);
                }
            }
        } else {
            for px in &mut self.rgb {
                f(px);
            }
        }
    }

    /// Clone the image-wide metadata (mask, options, load flags) onto a
    /// fresh buffer of the given size. Used by transforms that produce a
    /// new image.
    pub(crate) fn derived(&self, width: u32, height: u32, with_alpha: bool) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            rgb: vec![Rgb { r: 0, g: 0, b: 0 }; count],
            alpha: if with_alpha { Some(vec![0; count]) } else { None },
            mask: self.mask,
            options: self.options.clone(),
            format: self.format,
            load_flags: self.load_flags,
        }
    }
}

impl Default for RasterImage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RasterImage({}x{}, alpha: {}, mask: {:?})",
            self.width,
            self.height,
            self.alpha.is_some(),
            self.mask
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const RED: Rgb<u8> = Rgb { r: 255, g: 0, b: 0 };
    const BLACK: Rgb<u8> = Rgb { r: 0, g: 0, b: 0 };

    #[test]
    fn dimensions_after_reset() {
        let mut image = RasterImage::new();
        assert!(!image.is_ok());
        image.reset(7, 5);
        assert_eq!(image.width(), 7);
        assert_eq!(image.height(), 5);
        assert_eq!(image.pixel_count(), 35);
        assert!(image.is_ok());
        image.reset_empty();
        assert_eq!(image.size(), crate::geom::Size::new(0, 0));
        assert_eq!(image.pixel_count(), 0);
    }

    #[test]
    fn pixel_round_trip() {
        let mut image = RasterImage::with_size(3, 2);
        for y in 0..2 {
            for x in 0..3 {
                let c = Rgb {
                    r: x as u8,
                    g: y as u8,
                    b: 7,
                };
                image.set_rgb(x, y, c).unwrap();
                assert_eq!(image.rgb_at(x, y).unwrap(), c);
            }
        }
    }

    #[test]
    fn single_pixel_on_cleared_image() {
        let mut image = RasterImage::with_size(2, 2);
        image.clear(0);
        image.set_rgb(0, 0, RED).unwrap();
        assert_eq!(image.rgb_at(0, 0).unwrap(), RED);
        assert_eq!(image.rgb_at(1, 0).unwrap(), BLACK);
        assert_eq!(image.rgb_at(0, 1).unwrap(), BLACK);
        assert_eq!(image.rgb_at(1, 1).unwrap(), BLACK);
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let image = RasterImage::with_size(4, 4);
        assert!(matches!(
            image.rgb_at(4, 0),
            Err(ImageError::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(matches!(
            image.rgb_at(0, 4),
            Err(ImageError::OutOfBounds { .. })
        ));
        let empty = RasterImage::new();
        assert!(empty.rgb_at(0, 0).is_err());
    }

    #[test]
    fn rect_fill_and_full_fill() {
        let mut image = RasterImage::with_size(4, 4);
        image
            .set_rgb_rect(Some(Rect::new(1, 1, 2, 2)), RED)
            .unwrap();
        assert_eq!(image.rgb_at(0, 0).unwrap(), BLACK);
        assert_eq!(image.rgb_at(1, 1).unwrap(), RED);
        assert_eq!(image.rgb_at(2, 2).unwrap(), RED);
        assert_eq!(image.rgb_at(3, 3).unwrap(), BLACK);

        image.set_rgb_rect(None, BLACK).unwrap();
        assert!(image.pixels().iter().all(|&px| px == BLACK));

        assert!(matches!(
            image.set_rgb_rect(Some(Rect::new(3, 3, 2, 2)), RED),
            Err(ImageError::RectOutOfBounds { .. })
        ));
    }

    #[test]
    fn pixel_at_alpha_handling() {
        let mut image = RasterImage::with_size(1, 1);
        // No alpha channel: always opaque.
        assert_eq!(image.pixel_at(0, 0, true).unwrap().a, 255);

        image.init_alpha().unwrap();
        image.set_alpha(0, 0, 13).unwrap();
        assert_eq!(image.pixel_at(0, 0, true).unwrap().a, 13);
        assert_eq!(image.pixel_at(0, 0, false).unwrap().a, 255);
    }

    #[test]
    fn set_pixel_preserves_alpha_unless_asked() {
        let mut image = RasterImage::with_size(1, 1);
        image.init_alpha().unwrap();
        image.set_alpha(0, 0, 99).unwrap();

        let c = Rgba {
            r: 1,
            g: 2,
            b: 3,
            a: 200,
        };
        image.set_pixel(0, 0, c, false).unwrap();
        assert_eq!(image.alpha_at(0, 0).unwrap(), 99);

        image.set_pixel(0, 0, c, true).unwrap();
        assert_eq!(image.alpha_at(0, 0).unwrap(), 200);
    }

    #[test]
    fn channel_accessors() {
        let mut image = RasterImage::with_size(2, 1);
        image.set_rgb(1, 0, Rgb { r: 9, g: 8, b: 7 }).unwrap();
        assert_eq!(image.red_at(1, 0).unwrap(), 9);
        assert_eq!(image.green_at(1, 0).unwrap(), 8);
        assert_eq!(image.blue_at(1, 0).unwrap(), 7);
    }

    #[test]
    fn replace_color() {
        let mut image = RasterImage::with_size(2, 2);
        image.set_rgb(1, 1, RED).unwrap();
        image.replace(BLACK, Rgb { r: 0, g: 0, b: 255 });
        assert_eq!(image.rgb_at(0, 0).unwrap(), Rgb { r: 0, g: 0, b: 255 });
        assert_eq!(image.rgb_at(1, 1).unwrap(), RED);
    }

    #[test]
    fn from_pixels_validates_length() {
        let pixels = vec![BLACK; 5];
        assert!(RasterImage::from_pixels(2, 2, pixels.clone()).is_err());
        assert!(RasterImage::from_pixels(5, 1, pixels).is_ok());
    }

    #[test]
    fn from_raw_bytes_round_trip() {
        let bytes = vec![1, 2, 3, 4, 5, 6];
        let image = RasterImage::from_raw_bytes(2, 1, bytes).unwrap();
        assert_eq!(image.rgb_at(0, 0).unwrap(), Rgb { r: 1, g: 2, b: 3 });
        assert_eq!(image.rgb_at(1, 0).unwrap(), Rgb { r: 4, g: 5, b: 6 });
        assert_eq!(image.as_bytes(), &[1, 2, 3, 4, 5, 6]);

        assert!(RasterImage::from_raw_bytes(2, 1, vec![0; 5]).is_err());
    }

    #[test]
    fn view_round_trip() {
        let mut image = RasterImage::with_size(3, 2);
        image.set_rgb(2, 1, RED).unwrap();
        let view = image.view();
        assert_eq!(view.width(), 3);
        assert_eq!(view.height(), 2);
        let copy = RasterImage::from_view(view);
        assert_eq!(copy.rgb_at(2, 1).unwrap(), RED);
    }

    fn invert_opaque(image: &mut RasterImage) {
        image.map_opaque_pixels(|px| {
            px.r = 255 - px.r;
            px.g = 255 - px.g;
            px.b = 255 - px.b;
        });
    }

    #[test]
    fn map_opaque_pixels_skips_masked() {
        let mut image = RasterImage::with_size(2, 1);
        image.set_rgb(0, 0, RED).unwrap();
        image.set_mask_color(RED);
        invert_opaque(&mut image);
        assert_eq!(image.rgb_at(0, 0).unwrap(), RED);
        assert_eq!(
            image.rgb_at(1, 0).unwrap(),
            Rgb {
                r: 255,
                g: 255,
                b: 255
            }
        );
    }

    #[test]
    fn map_opaque_pixels_skips_fully_transparent() {
        let mut image = RasterImage::with_size(2, 1);
        image.init_alpha().unwrap();
        image.set_alpha(0, 0, 0).unwrap();
        invert_opaque(&mut image);
        assert_eq!(image.rgb_at(0, 0).unwrap(), BLACK);
        assert_eq!(
            image.rgb_at(1, 0).unwrap(),
            Rgb {
                r: 255,
                g: 255,
                b: 255
            }
        );
    }

    #[test]
    fn reset_keeps_load_flags() {
        let mut image = RasterImage::with_size(2, 2);
        image.set_load_flags(LoadFlags::NONE);
        image.options_mut().set_int("quality", 3);
        image.reset(1, 1);
        assert_eq!(image.load_flags(), LoadFlags::NONE);
        assert!(image.options().is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let mut image = RasterImage::with_size(2, 2);
        let copy = image.clone();
        image.set_rgb(0, 0, RED).unwrap();
        assert_eq!(copy.rgb_at(0, 0).unwrap(), BLACK);
        assert_ne!(image, copy);
    }
}
