//! Multipart character form: collection, boundary validation and conversion into
//! repository inputs. Nothing here touches storage.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use persona_core::{default_accent_color, default_text_color, AppError};
use validator::{Validate, ValidationError};

/// An uploaded file held in memory until the form has been validated.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub bytes: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Raw multipart fields. Every field is optional at this stage.
#[derive(Debug, Default, Clone)]
pub struct CharacterForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub accent_color: Option<String>,
    pub text_color: Option<String>,
    pub traits: Option<String>,
    pub interests: Option<String>,
    pub is_active: Option<String>,
    pub image: Option<FilePart>,
    pub background_image: Option<FilePart>,
}

impl CharacterForm {
    /// Read every field of the request. Files larger than `max_file_bytes` are
    /// rejected; unknown fields are ignored.
    pub async fn from_multipart(
        mut multipart: Multipart,
        max_file_bytes: usize,
    ) -> Result<Self, AppError> {
        let mut form = CharacterForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("Failed to read multipart", e))?
        {
            let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

            match field_name.as_str() {
                "image" | "backgroundImage" => {
                    let filename = field.file_name().map(|s| s.to_string());
                    let content_type = field.content_type().map(|s| s.to_string());
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error("Failed to read file data", e))?;
                    validate_file_size(bytes.len(), max_file_bytes)?;

                    let part = FilePart {
                        bytes,
                        filename,
                        content_type,
                    };
                    if field_name == "image" {
                        form.image = Some(part);
                    } else {
                        form.background_image = Some(part);
                    }
                }
                "name" | "description" | "personality" | "accentColor" | "textColor"
                | "traits" | "interests" | "isActive" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| multipart_error("Failed to read form field", e))?;
                    let slot = match field_name.as_str() {
                        "name" => &mut form.name,
                        "description" => &mut form.description,
                        "personality" => &mut form.personality,
                        "accentColor" => &mut form.accent_color,
                        "textColor" => &mut form.text_color,
                        "traits" => &mut form.traits,
                        "interests" => &mut form.interests,
                        _ => &mut form.is_active,
                    };
                    *slot = Some(value);
                }
                other => {
                    tracing::debug!(field = %other, "Ignoring unknown multipart field");
                }
            }
        }

        Ok(form)
    }

    /// Validate a create request. The profile image is mandatory.
    pub fn into_create(self) -> Result<CreateDraft, AppError> {
        let input = CreateCharacterInput {
            name: trimmed(self.name).unwrap_or_default(),
            description: trimmed(self.description).unwrap_or_default(),
            personality: trimmed(self.personality).unwrap_or_default(),
            accent_color: trimmed(self.accent_color).unwrap_or_else(default_accent_color),
            text_color: trimmed(self.text_color).unwrap_or_else(default_text_color),
        };
        input.validate()?;

        let image = self
            .image
            .filter(|part| !part.bytes.is_empty())
            .ok_or_else(|| AppError::InvalidInput("Profile image is required".to_string()))?;

        Ok(CreateDraft {
            input,
            traits: parse_list(self.traits.as_deref())?,
            interests: parse_list(self.interests.as_deref())?,
            image,
            background_image: self.background_image.filter(|part| !part.bytes.is_empty()),
        })
    }

    /// Validate an update request. Absent fields stay untouched.
    pub fn into_update(self) -> Result<UpdateDraft, AppError> {
        let input = UpdateCharacterInput {
            name: trimmed(self.name),
            description: trimmed(self.description),
            personality: trimmed(self.personality),
            accent_color: trimmed(self.accent_color),
            text_color: trimmed(self.text_color),
        };
        input.validate()?;

        let traits = match self.traits.as_deref() {
            Some(raw) => Some(parse_list(Some(raw))?),
            None => None,
        };
        let interests = match self.interests.as_deref() {
            Some(raw) => Some(parse_list(Some(raw))?),
            None => None,
        };
        let is_active = self.is_active.as_deref().map(parse_bool).transpose()?;

        Ok(UpdateDraft {
            input,
            traits,
            interests,
            is_active,
            image: self.image.filter(|part| !part.bytes.is_empty()),
            background_image: self.background_image.filter(|part| !part.bytes.is_empty()),
        })
    }
}

#[derive(Debug, Validate)]
pub struct CreateCharacterInput {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Description must be between 1 and 2000 characters"
    ))]
    pub description: String,
    #[validate(length(
        min = 1,
        max = 4000,
        message = "Personality must be between 1 and 4000 characters"
    ))]
    pub personality: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub accent_color: String,
    #[validate(custom(function = "validate_hex_color"))]
    pub text_color: String,
}

#[derive(Debug, Default, Validate)]
pub struct UpdateCharacterInput {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Description must be between 1 and 2000 characters"
    ))]
    pub description: Option<String>,
    #[validate(length(
        min = 1,
        max = 4000,
        message = "Personality must be between 1 and 4000 characters"
    ))]
    pub personality: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub accent_color: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub text_color: Option<String>,
}

/// A create request that passed validation.
#[derive(Debug)]
pub struct CreateDraft {
    pub input: CreateCharacterInput,
    pub traits: Vec<String>,
    pub interests: Vec<String>,
    pub image: FilePart,
    pub background_image: Option<FilePart>,
}

/// An update request that passed validation.
#[derive(Debug)]
pub struct UpdateDraft {
    pub input: UpdateCharacterInput,
    pub traits: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub image: Option<FilePart>,
    pub background_image: Option<FilePart>,
}

/// Body-limit overruns surface as 413, everything else as a bad request.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, err.body_text()))
    } else {
        AppError::InvalidInput(format!("{}: {}", context, err.body_text()))
    }
}

pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// `#rgb` or `#rrggbb`
fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('#').unwrap_or("");
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some("Color must be a hex value like #6366f1".into());
        Err(err)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Accepts a JSON array of strings or a comma-separated list.
pub fn parse_list(raw: Option<&str>) -> Result<Vec<String>, AppError> {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let items: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidInput(format!("Invalid list value: {}", e)))?
    } else {
        raw.split(',').map(str::to_string).collect()
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

fn parse_bool(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AppError::InvalidInput(format!(
            "isActive must be a boolean, got '{}'",
            other
        ))),
    }
}
