//! Error types for raster image operations.
//!
//! [`ImageError`] covers every failure the engine itself can produce.
//! [`CodecError`] is the opaque boundary error for the external codec
//! provider; the engine wraps it without interpreting it further.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use thiserror::Error;

use crate::format::ImageFormat;

/// Result alias for raster image operations.
pub type Result<T> = core::result::Result<T, ImageError>;

/// Errors from raster image operations.
///
/// Every fallible safe API returns `Result`; there are no panicking
/// variants in the public surface. Operations that need pixel data and
/// receive an empty image return [`ImageError::EmptyImage`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImageError {
    /// Pixel coordinate outside the image extents.
    #[error("pixel ({x}, {y}) outside {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// Rectangle not entirely contained in the image extents.
    #[error("rect at ({x}, {y}) size {rect_width}x{rect_height} not inside {width}x{height} image")]
    RectOutOfBounds {
        x: i32,
        y: i32,
        rect_width: u32,
        rect_height: u32,
        width: u32,
        height: u32,
    },
    /// Two images expected to share dimensions do not.
    #[error("expected a {expected_width}x{expected_height} image, got {width}x{height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
    /// Operation requires an alpha channel and the image has none.
    #[error("image has no alpha channel")]
    NoAlpha,
    /// Alpha channel already present where none was expected.
    #[error("image already has an alpha channel")]
    AlphaAlreadyPresent,
    /// Operation requires an active mask and the image has none.
    #[error("image has no active mask")]
    NoMask,
    /// The unused-color search ran past (255, 255, 255) without finding
    /// a free color.
    #[error("no unused color left in the 24-bit RGB space")]
    ColorSpaceExhausted,
    /// Malformed parameter (zero target size, mismatched buffer length).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Operation requires a non-empty image.
    #[error("operation requires a non-empty image")]
    EmptyImage,
    /// Failure propagated from the external codec provider.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Error from the external codec provider boundary.
///
/// The engine never interprets these beyond reporting; the `source` of
/// [`CodecError::Codec`] is whatever the provider produced.
#[derive(Debug)]
#[non_exhaustive]
pub enum CodecError {
    /// Format not recognized from magic bytes or hint.
    UnrecognizedFormat,
    /// Format recognized but not handled by this provider.
    UnsupportedFormat(ImageFormat),
    /// Requested frame index does not exist in the source.
    NoSuchFrame { frame: i32, count: u32 },
    /// Input validation failed.
    InvalidInput(String),
    /// I/O failure while reading or writing image data.
    #[cfg(feature = "std")]
    Io(std::io::Error),
    /// Underlying codec error.
    Codec {
        format: Option<ImageFormat>,
        source: Box<dyn core::error::Error + Send + Sync>,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnrecognizedFormat => write!(f, "unrecognized image format"),
            CodecError::UnsupportedFormat(format) => {
                write!(f, "format {format} not supported by this provider")
            }
            CodecError::NoSuchFrame { frame, count } => {
                write!(f, "frame {frame} does not exist (source has {count})")
            }
            CodecError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            #[cfg(feature = "std")]
            CodecError::Io(err) => write!(f, "i/o error: {err}"),
            CodecError::Codec { format: Some(format), source } => {
                write!(f, "codec error ({format}): {source}")
            }
            CodecError::Codec { format: None, source } => {
                write!(f, "codec error: {source}")
            }
        }
    }
}

impl core::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            CodecError::Codec { source, .. } => Some(source.as_ref()),
            #[cfg(feature = "std")]
            CodecError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl CodecError {
    /// Wrap a codec-specific error.
    pub fn from_codec<E>(format: Option<ImageFormat>, error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        CodecError::Codec {
            format,
            source: Box::new(error),
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::ToString;

    #[test]
    fn display_out_of_bounds() {
        let err = ImageError::OutOfBounds {
            x: 5,
            y: 7,
            width: 4,
            height: 4,
        };
        assert_eq!(format!("{err}"), "pixel (5, 7) outside 4x4 image");
    }

    #[test]
    fn display_codec_variants() {
        assert_eq!(
            CodecError::UnrecognizedFormat.to_string(),
            "unrecognized image format"
        );
        assert_eq!(
            CodecError::NoSuchFrame { frame: 3, count: 2 }.to_string(),
            "frame 3 does not exist (source has 2)"
        );
    }

    #[test]
    fn codec_error_wraps_into_image_error() {
        let err: ImageError = CodecError::UnrecognizedFormat.into();
        assert!(matches!(err, ImageError::Codec(_)));
    }

    #[test]
    fn codec_source_chain() {
        use core::error::Error;
        let inner = ImageError::NoAlpha;
        let err = CodecError::from_codec(Some(ImageFormat::Png), inner);
        assert!(err.source().is_some());
    }
}
