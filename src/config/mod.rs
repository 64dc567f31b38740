//! Configuration module - environment variable parsing

use std::env;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// WebSocket endpoint of the world server
    pub server_url: String,
    /// Display name sent with the join request
    pub username: String,
    /// Base directory or URL that relative asset sources resolve against
    pub asset_base: String,
    /// World map image source, resolved against the asset base
    pub world_image: String,
    /// Viewport width in logical units
    pub viewport_width: u32,
    /// Viewport height in logical units
    pub viewport_height: u32,
    /// TrueType font for name labels; labels are disabled when unset
    pub font_path: Option<String>,
    /// If set, every composed frame is written to this PNG path
    pub frame_dump: Option<String>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server_url: env::var("SERVER_URL")
                .unwrap_or_else(|_| "ws://127.0.0.1:8080/ws".to_string()),

            username: env::var("USERNAME").unwrap_or_else(|_| "guest".to_string()),

            asset_base: env::var("ASSET_BASE").unwrap_or_else(|_| "assets".to_string()),

            world_image: env::var("WORLD_IMAGE").unwrap_or_else(|_| "world.png".to_string()),

            viewport_width: parse_dimension("VIEWPORT_WIDTH", 800)?,
            viewport_height: parse_dimension("VIEWPORT_HEIGHT", 600)?,

            font_path: env::var("FONT_PATH").ok(),
            frame_dump: env::var("FRAME_DUMP").ok(),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Parse a positive pixel dimension, falling back to a default when unset
fn parse_dimension(var: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or(ConfigError::Invalid(var)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
