//! Image format utilities
//!
//! Maps between input formats detected from content or file name, the
//! output format a compressed image is written in, and the MIME types and
//! extensions attached to both.

use crate::constants::SUPPORTED_IMAGE_EXTENSIONS;
use image::ImageFormat;
use std::fmt;
use std::path::Path;

/// Formats a compressed image can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG, quality-controlled lossy output
    Jpeg,
    /// PNG re-encoded and optimised by oxipng
    Png,
    /// WebP, lossless only
    WebP,
}

impl OutputFormat {
    /// Output format chosen for a given input format.
    ///
    /// PNG and WebP keep their format; everything else decodable is
    /// re-encoded as JPEG.
    pub fn for_input(input: ImageFormat) -> Self {
        match input {
            ImageFormat::Png => OutputFormat::Png,
            ImageFormat::WebP => OutputFormat::WebP,
            _ => OutputFormat::Jpeg,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}

/// Detects the format of raw image bytes, falling back to the file name's
/// extension when the content has no recognisable signature.
pub fn detect_input_format(bytes: &[u8], name: &str) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(name).ok())
}

/// MIME type for an input file, `application/octet-stream` when unknown.
pub fn mime_type_for(bytes: &[u8], name: &str) -> String {
    detect_input_format(bytes, name)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Check if a file path carries a supported image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
