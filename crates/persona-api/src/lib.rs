//! Persona API Library
//!
//! HTTP handlers, services, middleware and application setup for the
//! character-chat backend.

mod handlers;
mod telemetry;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
