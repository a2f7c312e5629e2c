//! Image format tags and detection.
//!
//! [`ImageFormat`] names the container formats a codec provider may handle.
//! The engine itself never parses beyond the magic bytes used for
//! detection; decoding and encoding belong to the provider.

use alloc::string::String;

/// Known image container formats.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Ico,
    Tiff,
    Pnm,
}

impl ImageFormat {
    /// Detect format from magic bytes. Returns `None` if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.len() >= 8 && data[..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
            return Some(ImageFormat::Jpeg);
        }

        // GIF: "GIF87a" or "GIF89a"
        if data.len() >= 6
            && data[..3] == *b"GIF"
            && data[3] == b'8'
            && (data[4] == b'7' || data[4] == b'9')
            && data[5] == b'a'
        {
            return Some(ImageFormat::Gif);
        }

        // BMP: "BM"
        if data.len() >= 2 && data[..2] == *b"BM" {
            return Some(ImageFormat::Bmp);
        }

        // ICO: 00 00 01 00
        if data.len() >= 4 && data[..4] == [0x00, 0x00, 0x01, 0x00] {
            return Some(ImageFormat::Ico);
        }

        // TIFF: "II*\0" (little-endian) or "MM\0*" (big-endian)
        if data.len() >= 4
            && (data[..4] == [b'I', b'I', 0x2A, 0x00] || data[..4] == [b'M', b'M', 0x00, 0x2A])
        {
            return Some(ImageFormat::Tiff);
        }

        // PNM family: P1-P7
        if data.len() >= 2 && data[0] == b'P' && (b'1'..=b'7').contains(&data[1]) {
            return Some(ImageFormat::Pnm);
        }

        None
    }

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        // Manual case-insensitive comparison without std.
        let mut buf = [0u8; 8];
        let ext_bytes = ext.as_bytes();
        if ext_bytes.len() > buf.len() {
            return None;
        }
        for (i, &b) in ext_bytes.iter().enumerate() {
            buf[i] = b.to_ascii_lowercase();
        }
        let lower = &buf[..ext_bytes.len()];

        match lower {
            b"png" => Some(ImageFormat::Png),
            b"jpg" | b"jpeg" | b"jpe" | b"jfif" => Some(ImageFormat::Jpeg),
            b"gif" => Some(ImageFormat::Gif),
            b"bmp" | b"dib" => Some(ImageFormat::Bmp),
            b"ico" => Some(ImageFormat::Ico),
            b"tif" | b"tiff" => Some(ImageFormat::Tiff),
            b"pnm" | b"ppm" | b"pgm" | b"pbm" => Some(ImageFormat::Pnm),
            _ => None,
        }
    }

    /// Detect format from a MIME type string (case-insensitive).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mut buf = [0u8; 32];
        let mime_bytes = mime.as_bytes();
        if mime_bytes.len() > buf.len() {
            return None;
        }
        for (i, &b) in mime_bytes.iter().enumerate() {
            buf[i] = b.to_ascii_lowercase();
        }
        let lower = &buf[..mime_bytes.len()];

        match lower {
            b"image/png" => Some(ImageFormat::Png),
            b"image/jpeg" | b"image/jpg" => Some(ImageFormat::Jpeg),
            b"image/gif" => Some(ImageFormat::Gif),
            b"image/bmp" | b"image/x-bmp" => Some(ImageFormat::Bmp),
            b"image/x-icon" | b"image/vnd.microsoft.icon" => Some(ImageFormat::Ico),
            b"image/tiff" => Some(ImageFormat::Tiff),
            b"image/x-portable-anymap" => Some(ImageFormat::Pnm),
            _ => None,
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Ico => "image/x-icon",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Pnm => "image/x-portable-anymap",
        }
    }

    /// Common file extensions, primary first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Png => &["png"],
            ImageFormat::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::Bmp => &["bmp", "dib"],
            ImageFormat::Ico => &["ico"],
            ImageFormat::Tiff => &["tif", "tiff"],
            ImageFormat::Pnm => &["pnm", "ppm", "pgm", "pbm"],
        }
    }

    /// Whether this format can carry per-pixel alpha.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, ImageFormat::Jpeg | ImageFormat::Pnm)
    }

    /// Whether a single source may contain multiple frames (animation
    /// frames for GIF, pages for TIFF, sizes for ICO).
    pub fn supports_frames(self) -> bool {
        matches!(
            self,
            ImageFormat::Gif | ImageFormat::Tiff | ImageFormat::Ico
        )
    }
}

impl core::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Gif => "GIF",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Ico => "ICO",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Pnm => "PNM",
        })
    }
}

/// Build the file-dialog wildcard string for a set of formats.
///
/// The result has the shape `"(*.bmp;*.gif)|*.bmp;*.gif"`, listing every
/// extension of every format once, in order. Callers usually prepend a
/// description before handing it to a dialog.
pub fn ext_wildcard(formats: &[ImageFormat]) -> String {
    let mut masks = String::new();
    for format in formats {
        for ext in format.extensions() {
            if !masks.is_empty() {
                masks.push(';');
            }
            masks.push_str("*.");
            masks.push_str(ext);
        }
    }
    let mut out = String::with_capacity(masks.len() * 2 + 3);
    out.push('(');
    out.push_str(&masks);
    out.push_str(")|");
    out.push_str(&masks);
    out
}
