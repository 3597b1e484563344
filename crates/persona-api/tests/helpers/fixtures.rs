//! Test fixtures: encoded images and multipart forms.

use axum_test::multipart::{MultipartForm, Part};
use std::io::Cursor;

/// PNG of the given size with a gradient so encodings differ between sizes.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255])
    });
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer
}

/// Flat-colour PNG; compresses to a few KiB at any size.
pub fn create_solid_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([30, 60, 120, 255]));
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer
}

pub fn image_part(data: Vec<u8>, file_name: &str) -> Part {
    Part::bytes(data)
        .file_name(file_name)
        .mime_type("image/png")
}

/// Text fields of a valid character, without any image.
pub fn character_fields() -> MultipartForm {
    MultipartForm::new()
        .add_text("name", "Mira")
        .add_text("description", "Keeper of the northern lighthouse")
        .add_text("personality", "Warm, wry and patient")
        .add_text("traits", r#"["patient","curious"]"#)
        .add_text("interests", "storms, tides")
}

/// Valid create form with a 400x400 profile image.
pub fn character_form() -> MultipartForm {
    character_fields().add_part("image", image_part(create_test_png(400, 400), "mira.png"))
}
