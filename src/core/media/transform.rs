//! Image transforms
//!
//! Whole-buffer only: decode, fix orientation, optionally convert and
//! resize, re-encode.

use super::compress::{search_parameter, ParameterSweep};
use super::detect::detect_format;
use crate::config::AssetsConfig;
use crate::domain::{MirrorError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;

/// JPEG quality used when an image has to be re-encoded without compression
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Bounding box for [`fit_inside`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeBounds {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeBounds {
    fn is_unbounded(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Settings for the size-budget step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    pub threshold_bytes: u64,
    pub resize: ResizeBounds,
}

/// Decoded image with orientation already applied
pub struct UprightImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
    pub rotated: bool,
}

/// Orientation, format normalisation and compression for downloaded media
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaTransformer {
    normalize_format: bool,
    compression: Option<CompressionSettings>,
}

impl MediaTransformer {
    pub fn new(normalize_format: bool, compression: Option<CompressionSettings>) -> Self {
        Self {
            normalize_format,
            compression,
        }
    }

    /// Builds the transformer from the `[assets]` section
    pub fn from_config(config: &AssetsConfig) -> Self {
        let compression = if config.compression.enabled {
            config
                .compression
                .threshold_bytes
                .map(|threshold_bytes| CompressionSettings {
                    threshold_bytes,
                    resize: ResizeBounds {
                        width: config.compression.resize_width,
                        height: config.compression.resize_height,
                    },
                })
        } else {
            None
        };
        Self::new(config.normalize_format, compression)
    }

    /// Runs every enabled step over `bytes`
    ///
    /// Anything that isn't a PNG, JPEG or WebP image passes through
    /// untouched, as does an image whose header can't be decoded. Bytes are
    /// only re-encoded when something about the image actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Media`] if a decodable image fails to re-encode.
    pub fn process(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        let Some(format) = detect_format(&bytes).filter(is_transformable) else {
            return Ok(bytes);
        };

        let upright = match rotate_to_upright(&bytes) {
            Ok(upright) => upright,
            Err(e) => {
                tracing::warn!(error = %e, format = ?format, "Image could not be decoded, keeping original bytes");
                return Ok(bytes);
            }
        };

        let target = if self.normalize_format {
            normalized_format(upright.format)
        } else {
            upright.format
        };

        let mut image = upright.image;
        let mut changed = upright.rotated || target != upright.format;

        if let Some(settings) = &self.compression {
            if let Some(resized) = fit_inside(&image, settings.resize) {
                image = resized;
                changed = true;
            }
        }

        let baseline = if changed {
            encode(&image, target, None)?
        } else {
            bytes
        };

        let Some(settings) = self.compression else {
            return Ok(baseline);
        };

        let Some(sweep) = sweep_for(target) else {
            return Ok(baseline);
        };

        let before = baseline.len();
        let compressed = search_parameter(baseline, sweep, settings.threshold_bytes, |param| {
            encode(&image, target, Some(param))
        })?;

        tracing::debug!(
            format = ?target,
            before,
            after = compressed.len(),
            threshold = settings.threshold_bytes,
            "Image compressed"
        );

        Ok(compressed)
    }
}

fn is_transformable(format: &ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP
    )
}

/// Format substituted when normalisation is on
pub fn normalized_format(format: ImageFormat) -> ImageFormat {
    match format {
        ImageFormat::WebP => ImageFormat::Jpeg,
        other => other,
    }
}

fn sweep_for(format: ImageFormat) -> Option<ParameterSweep> {
    match format {
        ImageFormat::Jpeg => Some(ParameterSweep::JPEG_QUALITY),
        ImageFormat::Png => Some(ParameterSweep::PNG_EFFORT),
        _ => None,
    }
}

/// Decodes `bytes` and applies the embedded EXIF orientation
pub fn rotate_to_upright(bytes: &[u8]) -> Result<UprightImage> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| MirrorError::Media("Unrecognised image format".to_string()))?;

    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);

    Ok(UprightImage {
        image,
        format,
        rotated: orientation != Orientation::NoTransforms,
    })
}

/// Shrinks `image` to fit inside `bounds`, keeping the aspect ratio
///
/// Returns `None` when no bound is set or the image already fits; images
/// are never enlarged.
pub fn fit_inside(image: &DynamicImage, bounds: ResizeBounds) -> Option<DynamicImage> {
    if bounds.is_unbounded() {
        return None;
    }

    let max_width = bounds.width.unwrap_or(u32::MAX);
    let max_height = bounds.height.unwrap_or(u32::MAX);
    if image.width() <= max_width && image.height() <= max_height {
        return None;
    }

    Some(image.resize(max_width, max_height, FilterType::Lanczos3))
}

/// Encodes `image` as `format`
///
/// `param` is the JPEG quality or the PNG effort level (0 fast, 1 default,
/// 2 best); `None` picks the format's default. WebP is always lossless.
pub fn encode(image: &DynamicImage, format: ImageFormat, param: Option<i32>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        ImageFormat::Jpeg => {
            let quality = param
                .map(|q| q.clamp(1, 100) as u8)
                .unwrap_or(DEFAULT_JPEG_QUALITY);
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        }
        ImageFormat::Png => {
            let compression = match param {
                Some(p) if p <= 0 => CompressionType::Fast,
                Some(p) if p >= 2 => CompressionType::Best,
                _ => CompressionType::Default,
            };
            let encoder =
                PngEncoder::new_with_quality(&mut buffer, compression, PngFilter::Adaptive);
            image.write_with_encoder(encoder)?;
        }
        ImageFormat::WebP => {
            let encoder = WebPEncoder::new_lossless(&mut buffer);
            DynamicImage::ImageRgba8(image.to_rgba8()).write_with_encoder(encoder)?;
        }
        other => {
            return Err(MirrorError::Media(format!(
                "Encoding to {other:?} is not supported"
            )))
        }
    }

    Ok(buffer)
}

/// Converts encoded `bytes` to `target`, keeping orientation fixed
pub fn convert_format(bytes: &[u8], target: ImageFormat) -> Result<Vec<u8>> {
    let upright = rotate_to_upright(bytes)?;
    encode(&upright.image, target, None)
}
