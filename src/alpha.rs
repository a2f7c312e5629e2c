//! Mask and alpha channel management.
//!
//! An image can carry transparency two ways: a per-pixel alpha plane, or a
//! single "magic" mask color. Both may be active at once; transparency
//! queries prefer alpha when it exists, and the mask color is kept as a
//! hint. Converting between the two goes through the unused-color search.

use alloc::vec;

use rgb::Rgb;

use crate::error::{ImageError, Result};
use crate::image::RasterImage;

impl RasterImage {
    /// Whether the image has an alpha plane.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    /// Whether a mask color is active.
    #[inline]
    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// The active mask color, if any.
    #[inline]
    pub fn mask_color(&self) -> Option<Rgb<u8>> {
        self.mask
    }

    /// Allocate the alpha plane, fully opaque everywhere.
    ///
    /// When a mask is active, every pixel matching the mask color starts
    /// fully transparent instead; the mask color is retained as a hint but
    /// transparency queries use the new alpha data from here on.
    ///
    /// # Errors
    ///
    /// [`ImageError::AlphaAlreadyPresent`] if an alpha plane exists.
    pub fn init_alpha(&mut self) -> Result<()> {
        if self.alpha.is_some() {
            return Err(ImageError::AlphaAlreadyPresent);
        }
        let mut alpha = vec![Self::ALPHA_OPAQUE; self.rgb.len()];
        if let Some(mask) = self.mask {
            for (a, px) in alpha.iter_mut().zip(self.rgb.iter()) {
                if *px == mask {
                    *a = Self::ALPHA_TRANSPARENT;
                }
            }
        }
        self.alpha = Some(alpha);
        Ok(())
    }

    /// Drop the alpha plane.
    ///
    /// # Errors
    ///
    /// [`ImageError::NoAlpha`] if there is none to drop.
    pub fn clear_alpha(&mut self) -> Result<()> {
        if self.alpha.take().is_none() {
            return Err(ImageError::NoAlpha);
        }
        Ok(())
    }

    /// Alpha value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`ImageError::NoAlpha`] without an alpha plane;
    /// [`ImageError::OutOfBounds`] for a bad coordinate.
    pub fn alpha_at(&self, x: u32, y: u32) -> Result<u8> {
        let i = self.offset(x, y)?;
        let alpha = self.alpha.as_ref().ok_or(ImageError::NoAlpha)?;
        Ok(alpha[i])
    }

    /// Set the alpha value at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`ImageError::NoAlpha`] without an alpha plane;
    /// [`ImageError::OutOfBounds`] for a bad coordinate.
    pub fn set_alpha(&mut self, x: u32, y: u32, value: u8) -> Result<()> {
        let i = self.offset(x, y)?;
        let alpha = self.alpha.as_mut().ok_or(ImageError::NoAlpha)?;
        alpha[i] = value;
        Ok(())
    }

    /// Set every pixel's alpha to `value`, allocating the plane first if
    /// the image has none.
    pub fn set_alpha_all(&mut self, value: u8) {
        match self.alpha.as_mut() {
            Some(alpha) => alpha.fill(value),
            None => self.alpha = Some(vec![value; self.rgb.len()]),
        }
    }

    /// Activate or deactivate the mask without touching pixel data.
    ///
    /// Activating without a previously stored color uses black, matching
    /// a zero-initialized mask. Deactivating forgets the stored color.
    pub fn set_mask(&mut self, active: bool) {
        if active {
            self.mask.get_or_insert(Rgb { r: 0, g: 0, b: 0 });
        } else {
            self.mask = None;
        }
    }

    /// Set the mask color and activate the mask. Pixel data is untouched.
    pub fn set_mask_color(&mut self, color: Rgb<u8>) {
        self.mask = Some(color);
    }

    /// Whether the pixel at `(x, y)` is transparent: alpha below
    /// `threshold` when an alpha plane exists, else equality with the mask
    /// color when a mask is active, else `false`.
    pub fn is_transparent(&self, x: u32, y: u32, threshold: u8) -> Result<bool> {
        let i = self.offset(x, y)?;
        if let Some(alpha) = self.alpha.as_ref() {
            return Ok(alpha[i] < threshold);
        }
        if let Some(mask) = self.mask {
            return Ok(self.rgb[i] == mask);
        }
        Ok(false)
    }

    /// Convert the alpha plane to a mask, choosing the mask color via the
    /// unused-color search.
    ///
    /// Every pixel with alpha below `threshold` is recolored to the chosen
    /// color, the alpha plane is dropped, and the mask is activated.
    ///
    /// # Errors
    ///
    /// [`ImageError::NoAlpha`] without an alpha plane;
    /// [`ImageError::ColorSpaceExhausted`] when no unused color is left.
    pub fn convert_alpha_to_mask(&mut self, threshold: u8) -> Result<()> {
        if self.alpha.is_none() {
            return Err(ImageError::NoAlpha);
        }
        let mask = self.find_first_unused_color(None)?;
        self.convert_alpha_to_mask_with(mask, threshold)
    }

    /// Convert the alpha plane to a mask using the given mask color.
    ///
    /// # Errors
    ///
    /// [`ImageError::NoAlpha`] without an alpha plane.
    pub fn convert_alpha_to_mask_with(&mut self, mask: Rgb<u8>, threshold: u8) -> Result<()> {
        let alpha = self.alpha.take().ok_or(ImageError::NoAlpha)?;
        for (px, &a) in self.rgb.iter_mut().zip(alpha.iter()) {
            if a < threshold {
                *px = mask;
            }
        }
        self.mask = Some(mask);
        Ok(())
    }

    /// Derive a mask from a same-sized shape image: wherever `shape` has
    /// the color `shape_mask`, this image is recolored to a freshly found
    /// unused color, which becomes the active mask color.
    ///
    /// Builds a histogram over the whole image, so this is one of the
    /// expensive operations.
    ///
    /// # Errors
    ///
    /// [`ImageError::DimensionMismatch`] if `shape` differs in size;
    /// [`ImageError::ColorSpaceExhausted`] when no unused color is left.
    pub fn set_mask_from_image(&mut self, shape: &RasterImage, shape_mask: Rgb<u8>) -> Result<()> {
        if shape.width != self.width || shape.height != self.height {
            return Err(ImageError::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: shape.width,
                height: shape.height,
            });
        }
        let found = self.find_first_unused_color(None)?;
        for (px, shape_px) in self.rgb.iter_mut().zip(shape.rgb.iter()) {
            if *shape_px == shape_mask {
                *px = found;
            }
        }
        self.mask = Some(found);
        Ok(())
    }
}
