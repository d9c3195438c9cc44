//! Binary type sniffing

use image::ImageFormat;

/// Extension used when the signature is not recognised
pub const FALLBACK_EXTENSION: &str = "bin";

/// Image format from the leading magic bytes, if recognised
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// File extension for `bytes`, `bin` when unknown
///
/// # Examples
///
/// ```
/// use issue_mirror::core::media::detect::detect_extension;
///
/// assert_eq!(detect_extension(b"\x89PNG\r\n\x1a\n\0\0"), "png");
/// assert_eq!(detect_extension(b"plain text"), "bin");
/// ```
pub fn detect_extension(bytes: &[u8]) -> String {
    detect_format(bytes)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(FALLBACK_EXTENSION)
        .to_string()
}
