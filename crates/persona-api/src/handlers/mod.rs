pub mod admin;
pub mod characters;
pub mod chat;
pub mod health;
pub mod media;
