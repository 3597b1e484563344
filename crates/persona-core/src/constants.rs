//! Application-wide constants

/// Entity kind segment used in storage keys for character images.
pub const CHARACTER_ENTITY_KIND: &str = "characters";

/// Default accent color for a character card.
pub const DEFAULT_ACCENT_COLOR: &str = "#6366f1";

/// Default text color for a character card.
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";

/// Number of digits in a generated character id.
pub const CHARACTER_ID_DIGITS: u32 = 9;

/// File extensions accepted by the video gallery listing.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];

/// File extensions accepted by the carousel listing.
pub const CAROUSEL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Header carrying the admin shared secret.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
