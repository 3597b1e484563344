//! Persona Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by every Persona component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{
    BaseConfig, ChatConfig, Config, GalleryConfig, ImageConfig, ImageDefaults,
    LocalStorageConfig, RemoteStorageConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    default_accent_color, default_text_color, generate_character_id, Character,
    CharacterChanges, CharacterStats, ImageRole, NewCharacter,
};
pub use storage_types::StorageBackend;
