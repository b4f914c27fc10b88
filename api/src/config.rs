//! Runtime configuration from environment variables
//!
//! A `.env` file is loaded first when present. LLM providers without an API
//! key are simply disabled; AI endpoints then serve fallback content.

use std::env;

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Claude,
    OpenAi,
}

/// Credentials and endpoint for one hosted model API
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider used for text generation
    pub provider: LlmProviderKind,
    pub anthropic: Option<ProviderSettings>,
    pub openai: Option<ProviderSettings>,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub port: u16,
    pub jwt_secret: String,
    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = DatabaseConfig {
            url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            acquire_timeout_secs: parse_or(
                &get,
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
        };

        let provider = match get("LLM_PROVIDER").as_deref() {
            None | Some("claude") | Some("anthropic") => LlmProviderKind::Claude,
            Some("openai") => LlmProviderKind::OpenAi,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LLM_PROVIDER",
                    value: other.to_string(),
                });
            }
        };

        let anthropic = get("ANTHROPIC_API_KEY").map(|api_key| ProviderSettings {
            api_key,
            model: get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            base_url: get("ANTHROPIC_BASE_URL").unwrap_or_else(|| ANTHROPIC_API_BASE.to_string()),
        });

        let openai = get("OPENAI_API_KEY").map(|api_key| ProviderSettings {
            api_key,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_API_BASE.to_string()),
        });

        Ok(Config {
            database,
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            cors_origin: get("CORS_ORIGIN"),
            llm: LlmConfig {
                provider,
                anthropic,
                openai,
                embedding_model: get("OPENAI_EMBEDDING_MODEL")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                timeout_secs: parse_or(&get, "LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
