use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{CHARACTER_ID_DIGITS, DEFAULT_ACCENT_COLOR, DEFAULT_TEXT_COLOR};

/// Character profile as persisted and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub description: String,
    pub personality: String,
    pub image_url: String,
    pub background_image_url: Option<String>,
    pub accent_color: String,
    pub text_color: String,
    pub traits: Vec<String>,
    pub interests: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a new character once its images are stored.
#[derive(Debug, Clone)]
pub struct NewCharacter {
    pub id: String,
    pub name: String,
    pub description: String,
    pub personality: String,
    pub image_url: String,
    pub background_image_url: Option<String>,
    pub accent_color: String,
    pub text_color: String,
    pub traits: Vec<String>,
    pub interests: Vec<String>,
}

impl NewCharacter {
    /// Materialize the record as it will be stored, stamped with `now`.
    pub fn into_character(self, now: DateTime<Utc>) -> Character {
        Character {
            id: self.id,
            name: self.name,
            description: self.description,
            personality: self.personality,
            image_url: self.image_url,
            background_image_url: self.background_image_url,
            accent_color: self.accent_color,
            text_color: self.text_color,
            traits: self.traits,
            interests: self.interests,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CharacterChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub image_url: Option<String>,
    pub background_image_url: Option<String>,
    pub accent_color: Option<String>,
    pub text_color: Option<String>,
    pub traits: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl CharacterChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.personality.is_none()
            && self.image_url.is_none()
            && self.background_image_url.is_none()
            && self.accent_color.is_none()
            && self.text_color.is_none()
            && self.traits.is_none()
            && self.interests.is_none()
            && self.is_active.is_none()
    }

    /// Apply the changes in place and refresh `updated_at`.
    pub fn apply_to(self, character: &mut Character, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            character.name = v;
        }
        if let Some(v) = self.description {
            character.description = v;
        }
        if let Some(v) = self.personality {
            character.personality = v;
        }
        if let Some(v) = self.image_url {
            character.image_url = v;
        }
        if let Some(v) = self.background_image_url {
            character.background_image_url = Some(v);
        }
        if let Some(v) = self.accent_color {
            character.accent_color = v;
        }
        if let Some(v) = self.text_color {
            character.text_color = v;
        }
        if let Some(v) = self.traits {
            character.traits = v;
        }
        if let Some(v) = self.interests {
            character.interests = v;
        }
        if let Some(v) = self.is_active {
            character.is_active = v;
        }
        character.updated_at = now;
    }
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}

pub fn default_accent_color() -> String {
    DEFAULT_ACCENT_COLOR.to_string()
}

pub fn default_text_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

/// Generate a short numeric character id (no leading zero).
pub fn generate_character_id() -> String {
    let low = 10u64.pow(CHARACTER_ID_DIGITS - 1);
    let high = 10u64.pow(CHARACTER_ID_DIGITS);
    rand::rng().random_range(low..high).to_string()
}
