//! Codec provider boundary.
//!
//! The engine owns pixel manipulation; persistence belongs to an external
//! [`CodecProvider`]. Decode fills a [`RasterImage`] from encoded bytes,
//! encode drains one back out. The engine passes data through this
//! boundary without interpreting container formats itself.

use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::Rgb;

use crate::error::{CodecError, ImageError, Result};
use crate::format::ImageFormat;
use crate::image::RasterImage;
use crate::options::ImageOptions;

/// Frame index meaning "let the handler pick": the first frame for GIF
/// and TIFF, the largest and most colorful entry for ICO.
pub const DEFAULT_FRAME: i32 = -1;

/// Flags steering codec behavior during load, as a plain bitset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadFlags(u32);

impl LoadFlags {
    /// No flags set.
    pub const NONE: Self = LoadFlags(0);

    /// Ask the codec to report non-fatal warnings while loading.
    pub const VERBOSE: Self = LoadFlags(1);

    /// Raw bit value.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag in `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of the two flag sets.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        LoadFlags(self.0 | other.0)
    }

    /// `self` minus the flags in `other`.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        LoadFlags(self.0 & !other.0)
    }
}

impl Default for LoadFlags {
    /// Verbose loading is the historical default.
    fn default() -> Self {
        Self::VERBOSE
    }
}

/// Result of a successful decode: pixel data plus everything the codec
/// learned about transparency and metadata.
#[derive(Debug)]
#[non_exhaustive]
pub struct DecodedImage {
    /// Decoded RGB pixels.
    pub pixels: ImgVec<Rgb<u8>>,
    /// Per-pixel alpha plane, same pixel count as `pixels`, if the
    /// source had one.
    pub alpha: Option<Vec<u8>>,
    /// Mask color, if the source designated one (GIF transparency index,
    /// ICO mask).
    pub mask: Option<Rgb<u8>>,
    /// Options the codec extracted (resolution, quality hints).
    pub options: ImageOptions,
    /// The container format the data was decoded from.
    pub format: ImageFormat,
}

/// Borrowed view of an image handed to [`CodecProvider::encode`].
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct EncodeRequest<'a> {
    /// Pixels to encode.
    pub pixels: ImgRef<'a, Rgb<u8>>,
    /// Alpha plane, same pixel count, when the image has one.
    pub alpha: Option<&'a [u8]>,
    /// Active mask color, for formats that store keyed transparency.
    pub mask: Option<Rgb<u8>>,
    /// Options to embed where the format supports them.
    pub options: &'a ImageOptions,
}

/// External collaborator that decodes and encodes container formats.
///
/// The engine calls this boundary only for persistence and the
/// informational queries below; it never parses a container itself.
pub trait CodecProvider {
    /// Formats this provider handles, in preference order.
    fn formats(&self) -> &[ImageFormat];

    /// Decode `data` into pixels.
    ///
    /// `format` is a hint; `None` asks the provider to detect. `frame`
    /// selects one image from multi-frame sources, with
    /// [`DEFAULT_FRAME`] meaning the handler's default choice.
    fn decode(
        &self,
        data: &[u8],
        format: Option<ImageFormat>,
        frame: i32,
        flags: LoadFlags,
    ) -> core::result::Result<DecodedImage, CodecError>;

    /// Encode a pixel buffer into `format`.
    fn encode(
        &self,
        request: &EncodeRequest<'_>,
        format: ImageFormat,
    ) -> core::result::Result<Vec<u8>, CodecError>;

    /// Whether any handled format recognizes `data`.
    fn can_decode(&self, data: &[u8]) -> bool {
        ImageFormat::detect(data).is_some_and(|format| self.formats().contains(&format))
    }

    /// Number of frames in `data`. Most formats hold exactly one; GIF,
    /// TIFF, and ICO sources may hold more.
    fn frame_count(
        &self,
        data: &[u8],
        format: Option<ImageFormat>,
    ) -> core::result::Result<u32, CodecError> {
        let _ = (data, format);
        Ok(1)
    }
}

impl RasterImage {
    /// Decode a new image through `provider`.
    ///
    /// # Errors
    ///
    /// [`ImageError::Codec`] wrapping whatever the provider reported.
    pub fn decode_from(
        provider: &dyn CodecProvider,
        data: &[u8],
        format: Option<ImageFormat>,
        frame: i32,
    ) -> Result<RasterImage> {
        let mut image = RasterImage::new();
        image.load_from(provider, data, format, frame)?;
        Ok(image)
    }

    /// Decode into this image, replacing its contents. The image's
    /// stored [`load_flags`](Self::load_flags) are passed to the
    /// provider, so flags set once apply to every later load.
    pub fn load_from(
        &mut self,
        provider: &dyn CodecProvider,
        data: &[u8],
        format: Option<ImageFormat>,
        frame: i32,
    ) -> Result<()> {
        let decoded = provider.decode(data, format, frame, self.load_flags)?;
        let (buf, width, height) = decoded.pixels.as_ref().to_contiguous_buf();
        let count = width * height;
        if let Some(alpha) = decoded.alpha.as_ref() {
            if alpha.len() != count {
                return Err(ImageError::Codec(CodecError::InvalidInput(
                    "decoded alpha plane does not match pixel count".into(),
                )));
            }
        }
        self.width = width as u32;
        self.height = height as u32;
        self.rgb = buf.into_owned();
        self.alpha = decoded.alpha;
        self.mask = decoded.mask;
        self.options = decoded.options;
        self.format = Some(decoded.format);
        Ok(())
    }

    /// Encode this image through `provider`.
    ///
    /// # Errors
    ///
    /// [`ImageError::EmptyImage`] when there is nothing to encode;
    /// [`ImageError::Codec`] wrapping provider failures.
    pub fn encode_to(&self, provider: &dyn CodecProvider, format: ImageFormat) -> Result<Vec<u8>> {
        if !self.is_ok() {
            return Err(ImageError::EmptyImage);
        }
        let request = EncodeRequest {
            pixels: self.view(),
            alpha: self.alpha_data(),
            mask: self.mask,
            options: &self.options,
        };
        Ok(provider.encode(&request, format)?)
    }

    /// Read and decode an image file. When `format` is `None`, the file
    /// extension is tried as a hint before handing the provider the raw
    /// bytes for detection.
    #[cfg(feature = "std")]
    pub fn load_file(
        provider: &dyn CodecProvider,
        path: impl AsRef<std::path::Path>,
        format: Option<ImageFormat>,
        frame: i32,
    ) -> Result<RasterImage> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(CodecError::Io)?;
        let hint = format.or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
        });
        Self::decode_from(provider, &data, hint, frame)
    }

    /// Encode and write this image to a file. When `format` is `None`,
    /// it is derived from the file extension.
    ///
    /// # Errors
    ///
    /// [`CodecError::UnrecognizedFormat`] (wrapped) when no format is
    /// given and the extension is unknown.
    #[cfg(feature = "std")]
    pub fn save_file(
        &self,
        provider: &dyn CodecProvider,
        path: impl AsRef<std::path::Path>,
        format: Option<ImageFormat>,
    ) -> Result<()> {
        let path = path.as_ref();
        let format = match format {
            Some(format) => format,
            None => path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
                .ok_or(ImageError::Codec(CodecError::UnrecognizedFormat))?,
        };
        let bytes = self.encode_to(provider, format)?;
        std::fs::write(path, bytes).map_err(CodecError::Io)?;
        Ok(())
    }
}
