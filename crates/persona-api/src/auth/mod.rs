//! Admin authentication: a single shared secret compared in constant time.

mod admin_key;

pub use admin_key::{admin_auth_middleware, AdminAuthState};
