//! Persona Processing Library
//!
//! Image normalization for uploaded character artwork: decode, orient, resize to the
//! role's geometry and re-encode as lossy WebP.

#[cfg(feature = "image")]
pub mod compression;
pub mod error;
#[cfg(feature = "image")]
pub mod image;

pub use error::{TransformError, TransformResult};
#[cfg(feature = "image")]
pub use image::{ImageTransformer, ProcessedImage, TransformOptions, TransformOverrides};
