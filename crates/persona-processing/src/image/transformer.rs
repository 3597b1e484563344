//! Image transformer - decode, orient, fit and encode in one pass

use crate::compression::{ImageCompressor, WEBP_CONTENT_TYPE, WEBP_EXTENSION};
use crate::error::{TransformError, TransformResult};
use crate::image::resize::{FitMode, ImageResize};
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use persona_core::{ImageDefaults, ImageRole};
use std::io::Cursor;
use std::path::Path;

/// Resolved geometry and quality for one transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

/// Caller overrides; unset fields fall back to the role defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
}

impl TransformOptions {
    pub fn merged(defaults: ImageDefaults, overrides: &TransformOverrides) -> Self {
        Self {
            width: overrides.width.unwrap_or(defaults.width),
            height: overrides.height.unwrap_or(defaults.height),
            quality: overrides.quality.unwrap_or(defaults.quality),
        }
    }

    fn validate(&self) -> TransformResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TransformError::InvalidOptions(format!(
                "target size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(TransformError::InvalidOptions(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

impl From<ImageDefaults> for TransformOptions {
    fn from(defaults: ImageDefaults) -> Self {
        Self {
            width: defaults.width,
            height: defaults.height,
            quality: defaults.quality,
        }
    }
}

/// Normalized image ready for storage
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Main image transformer
pub struct ImageTransformer;

impl ImageTransformer {
    /// Fit mode used for each role: profiles fill their square, backgrounds are
    /// letterboxed by the client and only shrink.
    pub fn fit_mode(role: ImageRole) -> FitMode {
        match role {
            ImageRole::Profile => FitMode::Cover,
            ImageRole::Background => FitMode::Contain,
        }
    }

    /// Transform raw upload bytes for `role`.
    ///
    /// CPU-bound; async callers should run this on the blocking pool.
    pub fn transform(
        data: &[u8],
        role: ImageRole,
        options: TransformOptions,
    ) -> TransformResult<ProcessedImage> {
        options.validate()?;

        let start = std::time::Instant::now();
        let img = Self::decode(data)?;
        let (orig_width, orig_height) = img.dimensions();

        let fitted = ImageResize::apply(&img, options.width, options.height, Self::fit_mode(role));
        let (width, height) = fitted.dimensions();

        let encoded = ImageCompressor::compress_webp(&fitted, options.quality)?;

        tracing::debug!(
            role = %role,
            orig_width,
            orig_height,
            width,
            height,
            input_bytes = data.len(),
            output_bytes = encoded.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image transformed"
        );

        Ok(ProcessedImage {
            data: encoded,
            width,
            height,
            content_type: WEBP_CONTENT_TYPE,
            extension: WEBP_EXTENSION,
        })
    }

    /// Transform a staged file on disk.
    pub fn transform_file(
        path: &Path,
        role: ImageRole,
        options: TransformOptions,
    ) -> TransformResult<ProcessedImage> {
        let data = std::fs::read(path)?;
        Self::transform(&data, role, options)
    }

    /// Decode any supported format, applying the EXIF orientation when present.
    fn decode(data: &[u8]) -> TransformResult<DynamicImage> {
        if data.is_empty() {
            return Err(TransformError::Decode("empty input".to_string()));
        }

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(TransformError::Decode("unrecognized image format".to_string()));
        }

        let mut decoder = reader
            .into_decoder()
            .map_err(|e| TransformError::Decode(e.to_string()))?;
        let orientation = decoder
            .orientation()
            .map_err(|e| TransformError::Decode(e.to_string()))?;
        let mut img =
            DynamicImage::from_decoder(decoder).map_err(|e| TransformError::Decode(e.to_string()))?;
        img.apply_orientation(orientation);

        Ok(img)
    }
}
