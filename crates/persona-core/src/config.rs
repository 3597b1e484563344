//! Configuration module
//!
//! Configuration is read once at startup (environment, optionally seeded from a
//! `.env` file) and shared by reference with every component afterwards.

use std::env;
use std::path::PathBuf;

use crate::models::ImageRole;

// Common constants
const SERVER_PORT: u16 = 3000;
const DB_MAX_CONNECTIONS: u32 = 10;
const MAX_UPLOAD_MB: usize = 10;
const REMOTE_STORAGE_TIMEOUT_SECS: u64 = 30;
const PROFILE_SIZE: (u32, u32) = (400, 400);
const BACKGROUND_SIZE: (u32, u32) = (1200, 800);
const IMAGE_QUALITY: u8 = 85;
const CHAT_MAX_TOKENS: u32 = 500;
const CHAT_TEMPERATURE: f32 = 0.8;
const CHAT_TIMEOUT_SECS: u64 = 60;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub admin_api_key: String,
}

/// CDN-backed object storage (PUT with a static access key)
#[derive(Clone, Debug)]
pub struct RemoteStorageConfig {
    pub access_key: String,
    pub storage_zone: String,
    pub base_url: String,
    pub cdn_base_url: String,
    pub timeout_secs: u64,
}

/// On-disk fallback storage served through a static route
#[derive(Clone, Debug)]
pub struct LocalStorageConfig {
    pub base_path: PathBuf,
    pub route_prefix: String,
}

/// Output geometry and quality for one image role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDefaults {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

#[derive(Clone, Debug)]
pub struct ImageConfig {
    pub profile: ImageDefaults,
    pub background: ImageDefaults,
    pub max_upload_bytes: usize,
    pub tmp_dir: PathBuf,
}

impl ImageConfig {
    pub fn defaults_for(&self, role: ImageRole) -> ImageDefaults {
        match role {
            ImageRole::Profile => self.profile,
            ImageRole::Background => self.background,
        }
    }
}

/// Gallery listing prefixes on the remote store
#[derive(Clone, Debug)]
pub struct GalleryConfig {
    pub videos_prefix: String,
    pub carousel_prefix: String,
}

/// Hosted chat-completion provider (OpenAI-compatible API)
#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    /// `None` when the remote credentials are incomplete; uploads then go to local only.
    pub remote_storage: Option<RemoteStorageConfig>,
    pub local_storage: LocalStorageConfig,
    pub images: ImageConfig,
    pub gallery: GalleryConfig,
    pub chat: ChatConfig,
}

impl Config {
    /// Load configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = get("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let admin_api_key = get("ADMIN_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("ADMIN_API_KEY must be set"))?;

        let base = BaseConfig {
            server_port: parse_or(get("SERVER_PORT").or_else(|| get("PORT")), SERVER_PORT)?,
            environment,
            cors_origins,
            database_url: get("DATABASE_URL"),
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), DB_MAX_CONNECTIONS)?,
            admin_api_key,
        };

        let remote_storage = match (
            get("BUNNY_STORAGE_ACCESS_KEY"),
            get("BUNNY_STORAGE_ZONE"),
            get("BUNNY_CDN_BASE_URL"),
        ) {
            (Some(access_key), Some(storage_zone), Some(cdn_base_url)) => {
                Some(RemoteStorageConfig {
                    access_key,
                    storage_zone,
                    base_url: get("BUNNY_STORAGE_BASE_URL")
                        .unwrap_or_else(|| "https://storage.bunnycdn.com".to_string()),
                    cdn_base_url,
                    timeout_secs: parse_or(
                        get("REMOTE_STORAGE_TIMEOUT_SECS"),
                        REMOTE_STORAGE_TIMEOUT_SECS,
                    )?,
                })
            }
            _ => None,
        };

        let local_storage = LocalStorageConfig {
            base_path: PathBuf::from(
                get("LOCAL_STORAGE_PATH").unwrap_or_else(|| "./uploads".to_string()),
            ),
            route_prefix: get("LOCAL_STORAGE_ROUTE").unwrap_or_else(|| "/uploads".to_string()),
        };

        let quality = parse_or(get("IMAGE_QUALITY"), IMAGE_QUALITY)?;
        let images = ImageConfig {
            profile: ImageDefaults {
                width: parse_or(get("PROFILE_IMAGE_WIDTH"), PROFILE_SIZE.0)?,
                height: parse_or(get("PROFILE_IMAGE_HEIGHT"), PROFILE_SIZE.1)?,
                quality,
            },
            background: ImageDefaults {
                width: parse_or(get("BACKGROUND_IMAGE_WIDTH"), BACKGROUND_SIZE.0)?,
                height: parse_or(get("BACKGROUND_IMAGE_HEIGHT"), BACKGROUND_SIZE.1)?,
                quality,
            },
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), MAX_UPLOAD_MB * 1024 * 1024)?,
            tmp_dir: get("UPLOAD_TMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        };

        let gallery = GalleryConfig {
            videos_prefix: get("VIDEOS_PREFIX").unwrap_or_else(|| "videos".to_string()),
            carousel_prefix: get("CAROUSEL_PREFIX").unwrap_or_else(|| "carousel".to_string()),
        };

        let chat = ChatConfig {
            api_key: get("CHAT_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            api_base: get("CHAT_API_BASE")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: get("CHAT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            max_tokens: parse_or(get("CHAT_MAX_TOKENS"), CHAT_MAX_TOKENS)?,
            temperature: parse_or(get("CHAT_TEMPERATURE"), CHAT_TEMPERATURE)?,
            timeout_secs: parse_or(get("CHAT_TIMEOUT_SECS"), CHAT_TIMEOUT_SECS)?,
        };

        Ok(Config {
            base,
            remote_storage,
            local_storage,
            images,
            gallery,
            chat,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.base.admin_api_key.len() < 16 {
            return Err(anyhow::anyhow!(
                "ADMIN_API_KEY must be at least 16 characters long"
            ));
        }

        for (role, defaults) in [
            (ImageRole::Profile, self.images.profile),
            (ImageRole::Background, self.images.background),
        ] {
            if defaults.width == 0 || defaults.height == 0 {
                return Err(anyhow::anyhow!("{} image dimensions must be non-zero", role));
            }
            if !(1..=100).contains(&defaults.quality) {
                return Err(anyhow::anyhow!("IMAGE_QUALITY must be between 1 and 100"));
            }
        }

        if let Some(url) = &self.base.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if !self.local_storage.route_prefix.starts_with('/') {
            return Err(anyhow::anyhow!("LOCAL_STORAGE_ROUTE must start with '/'"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }
}

fn parse_or<T>(value: Option<String>, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid configuration value '{}': {}", raw, e)),
        None => Ok(default),
    }
}
