//! Image processing module
//!
//! - Geometry for the two fit modes (resize)
//! - Decode, orient, fit and encode pipeline (transformer)

pub mod resize;
pub mod transformer;

pub use resize::{FitMode, ImageResize};
pub use transformer::{ImageTransformer, ProcessedImage, TransformOptions, TransformOverrides};
