//! Client configuration
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use std::env;

use chat_core::{Intents, Snowflake};

pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v9";
pub const DEFAULT_GATEWAY_VERSION: u8 = 9;

/// Settings shared by the REST client, the gateway session and the dispatcher
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bot token, with or without the `Bot ` prefix
    pub token: String,
    pub api_base_url: String,
    pub gateway_version: u8,
    /// Guild that commands without an explicit guild are registered to
    pub default_guild_id: Option<Snowflake>,
    /// Reported as browser and device in identify properties
    pub client_name: String,
    pub intents: Intents,
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            gateway_version: DEFAULT_GATEWAY_VERSION,
            default_guild_id: None,
            client_name: default_client_name(),
            intents: Intents::non_privileged(),
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_default_guild(mut self, guild_id: Snowflake) -> Self {
        self.default_guild_id = Some(guild_id);
        self
    }

    #[must_use]
    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `BOT_TOKEN` is missing or a variable fails to parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("BOT_TOKEN")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingVar("BOT_TOKEN"))?;

        let gateway_version = match lookup("GATEWAY_VERSION") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("GATEWAY_VERSION", raw))?,
            None => DEFAULT_GATEWAY_VERSION,
        };

        let default_guild_id = lookup("DEFAULT_GUILD_ID")
            .filter(|s| !s.is_empty())
            .map(|raw| {
                Snowflake::parse(&raw).map_err(|_| ConfigError::InvalidValue("DEFAULT_GUILD_ID", raw))
            })
            .transpose()?;

        let intents = match lookup("INTENTS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Intents::from_bits_truncate)
                .map_err(|_| ConfigError::InvalidValue("INTENTS", raw))?,
            None => Intents::non_privileged(),
        };

        Ok(Self {
            token,
            api_base_url: lookup("API_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            gateway_version,
            default_guild_id,
            client_name: lookup("CLIENT_NAME").unwrap_or_else(default_client_name),
            intents,
        })
    }
}

fn default_client_name() -> String {
    "chat-sdk".to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
