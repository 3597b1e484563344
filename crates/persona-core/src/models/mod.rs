pub mod character;
pub mod image;

pub use character::{
    default_accent_color, default_text_color, generate_character_id, Character,
    CharacterChanges, CharacterStats, NewCharacter,
};
pub use image::ImageRole;
