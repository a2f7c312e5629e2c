//! Platform-independent raster image engine.
//!
//! This crate owns an in-memory RGB(+alpha) pixel buffer and the
//! deterministic algorithms that operate on it:
//!
//! - [`RasterImage`]: the pixel buffer with its accessors, mask and alpha
//!   state, and case-insensitive [`ImageOptions`] metadata
//! - [`Histogram`]: color-presence set and the unused-color search
//! - Geometric transforms: mirror, rotation, sub-image, [`BlendMode`]
//!   paste, canvas resize without scaling
//! - Resampling: [`ScaleQuality`]-tiered scaling and separable box blur
//! - Color transforms: greyscale, mono, disabled, lightness, and
//!   [`Hsv`]-based hue/saturation/brightness adjustments
//!
//! Compressed formats are not parsed here: persistence goes through the
//! external [`CodecProvider`] boundary, keyed by [`ImageFormat`] tags.
//! The `std` feature (on by default) adds file-path convenience I/O; the
//! core works on `no_std` with `alloc`.
//!
//! Every image is exclusively owned by one logical owner at a time;
//! operations run synchronously on the calling thread. Transforms that
//! return a new image never share storage with their source.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod alpha;
mod codec;
mod color;
mod error;
mod format;
mod geom;
mod histogram;
mod image;
mod options;
mod resample;
mod trace;
mod transform;

pub use codec::{CodecProvider, DecodedImage, EncodeRequest, LoadFlags, DEFAULT_FRAME};
pub use color::Hsv;
pub use error::{CodecError, ImageError, Result};
pub use format::{ext_wildcard, ImageFormat};
pub use geom::{Point, Rect, Size};
pub use histogram::Histogram;
pub use image::RasterImage;
pub use options::{names as option_names, ImageOptions, OptionValue};
pub use resample::ScaleQuality;
pub use transform::BlendMode;

// Re-exports for callers that construct pixel data directly.
pub use imgref::{Img, ImgRef, ImgRefMut, ImgVec};
pub use rgb;
pub use rgb::{Rgb, Rgba};
