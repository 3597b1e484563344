use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// How an image is fitted into its target box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Fill the box exactly, cropping the overflow around the center
    Cover,
    /// Fit inside the box keeping the aspect ratio; never upscale
    Contain,
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Output size for `Contain`: the largest size within the box with the source
    /// aspect ratio, capped at the source size.
    pub fn contain_dimensions(
        orig_width: u32,
        orig_height: u32,
        max_width: u32,
        max_height: u32,
    ) -> (u32, u32) {
        if orig_width <= max_width && orig_height <= max_height {
            return (orig_width, orig_height);
        }

        let scale = (max_width as f64 / orig_width as f64).min(max_height as f64 / orig_height as f64);
        let width = ((orig_width as f64 * scale).round() as u32).clamp(1, max_width);
        let height = ((orig_height as f64 * scale).round() as u32).clamp(1, max_height);
        (width, height)
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    pub fn apply(img: &DynamicImage, width: u32, height: u32, mode: FitMode) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();

        match mode {
            FitMode::Cover => {
                if (orig_width, orig_height) == (width, height) {
                    return img.clone();
                }
                let filter = Self::select_filter(orig_width, orig_height, width, height);
                img.resize_to_fill(width, height, filter)
            }
            FitMode::Contain => {
                let (new_width, new_height) =
                    Self::contain_dimensions(orig_width, orig_height, width, height);
                if (new_width, new_height) == (orig_width, orig_height) {
                    return img.clone();
                }
                let filter = Self::select_filter(orig_width, orig_height, new_width, new_height);
                img.resize_exact(new_width, new_height, filter)
            }
        }
    }
}
