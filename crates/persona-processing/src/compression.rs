//! Output encoding
//!
//! Every stored image is lossy WebP regardless of the input format.

use crate::error::{TransformError, TransformResult};
use bytes::Bytes;
use image::{DynamicImage, GenericImageView};

pub const WEBP_CONTENT_TYPE: &str = "image/webp";
pub const WEBP_EXTENSION: &str = "webp";

/// Main compression service
pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode to lossy WebP at `quality` (1-100)
    pub fn compress_webp(img: &DynamicImage, quality: u8) -> TransformResult<Bytes> {
        if !(1..=100).contains(&quality) {
            return Err(TransformError::InvalidOptions(format!(
                "quality must be between 1 and 100, got {}",
                quality
            )));
        }

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(TransformError::Encode("image has no pixels".to_string()));
        }

        // Convert to RGBA for WebP encoding
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder.encode(quality as f32);

        if webp_data.is_empty() {
            return Err(TransformError::Encode("WebP encoder produced no output".to_string()));
        }

        Ok(Bytes::copy_from_slice(&webp_data))
    }
}
