//! Image types accepted by the Tinify API
//!
//! This module provides type-safe handling of the formats the service can
//! compress and convert between, replacing string-based lookups with an enum.

use crate::error::{Result, TinifyError};
use image::ImageFormat;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported image types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Png,
    Jpeg,
    WebP,
    Avif,
}

impl ImageType {
    /// Looks up a type by its short name ("png", "jpeg", "webp", "avif").
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "png" => Some(ImageType::Png),
            "jpeg" => Some(ImageType::Jpeg),
            "webp" => Some(ImageType::WebP),
            "avif" => Some(ImageType::Avif),
            _ => None,
        }
    }

    /// Returns the canonical MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::WebP => "image/webp",
            ImageType::Avif => "image/avif",
        }
    }

    /// Returns the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpg",
            ImageType::WebP => "webp",
            ImageType::Avif => "avif",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpeg",
            ImageType::WebP => "webp",
            ImageType::Avif => "avif",
        }
    }

    /// Get type names for CLI help text
    pub fn names() -> Vec<&'static str> {
        vec!["png", "jpeg", "webp", "avif"]
    }

    /// Detects the type from the leading bytes of an image.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Png => Some(ImageType::Png),
            ImageFormat::Jpeg => Some(ImageType::Jpeg),
            ImageFormat::WebP => Some(ImageType::WebP),
            ImageFormat::Avif => Some(ImageType::Avif),
            _ => None,
        }
    }

    /// Guesses the type from a file extension, accepting "jpg" as well.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" => Some(ImageType::Jpeg),
            other => ImageType::from_name(other),
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageType::Png => "PNG",
            ImageType::Jpeg => "JPEG",
            ImageType::WebP => "WebP",
            ImageType::Avif => "AVIF",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ImageType {
    type Err = TinifyError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "jpg" => Ok(ImageType::Jpeg),
            other => ImageType::from_name(other).ok_or_else(|| {
                TinifyError::validation(format!("unsupported image type: {:?}", s))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_is_exact() {
        assert_eq!(ImageType::from_name("png"), Some(ImageType::Png));
        assert_eq!(ImageType::from_name("avif"), Some(ImageType::Avif));
        assert_eq!(ImageType::from_name("jpg"), None);
        assert_eq!(ImageType::from_name("gif"), None);
    }

    #[test]
    fn test_from_str_is_lenient() {
        assert_eq!(ImageType::from_str("JPG").unwrap(), ImageType::Jpeg);
        assert_eq!(ImageType::from_str(" WebP ").unwrap(), ImageType::WebP);
        assert!(ImageType::from_str("tiff").is_err());
    }

    #[test]
    fn test_sniff_magic_bytes() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(ImageType::sniff(&png), Some(ImageType::Png));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(ImageType::sniff(&jpeg), Some(ImageType::Jpeg));

        let webp = *b"RIFF\x24\x00\x00\x00WEBPVP8 ";
        assert_eq!(ImageType::sniff(&webp), Some(ImageType::WebP));

        assert_eq!(ImageType::sniff(b"GIF89a......"), None);
        assert_eq!(ImageType::sniff(b"not an image at all"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(ImageType::from_path(Path::new("out.JPG")), Some(ImageType::Jpeg));
        assert_eq!(ImageType::from_path(Path::new("out.webp")), Some(ImageType::WebP));
        assert_eq!(ImageType::from_path(Path::new("out.bmp")), None);
        assert_eq!(ImageType::from_path(Path::new("out")), None);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ImageType::Png.mime_type(), "image/png");
        assert_eq!(ImageType::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageType::WebP.mime_type(), "image/webp");
        assert_eq!(ImageType::Avif.mime_type(), "image/avif");
    }
}
