//! Runtime settings read from the environment.
//!
//! | Variable                     | Default                     |
//! |------------------------------|-----------------------------|
//! | `AI_BACKEND`                 | `ollama`                    |
//! | `OLLAMA_BASE_URL`            | `http://localhost:11434`    |
//! | `OLLAMA_MODEL`               | `llama3.2`                  |
//! | `ATOMA_API_KEY`              | none                        |
//! | `ATOMA_BASE_URL`             | `https://api.atoma.ai`      |
//! | `ATOMA_MODEL`                | `llama3.2`                  |
//! | `OPENROUTER_API_KEY`         | none                        |
//! | `OPENROUTER_MODEL`           | `meta-llama/llama-3.2-3b-instruct` |
//! | `ELIZAO_CYCLE_INTERVAL_SECS` | `300`                       |
//! | `ELIZAO_STRICT_ROUTING`      | `false`                     |
//! | `ELIZAO_MODEL_TIMEOUT_SECS`  | `30`                        |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{ConfigError, Result};

/// Default pause between scheduling cycles.
pub const DEFAULT_CYCLE_INTERVAL_SECS: u64 = 300;

/// Default per-request timeout for model backends.
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 30;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_ATOMA_URL: &str = "https://api.atoma.ai";
const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api";
const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-3.2-3b-instruct";

/// Loads `.env.local` and `.env` from the working directory if present.
///
/// Variables already set in the process environment win.
pub fn load_env_files() {
    if dotenvy::from_filename(".env.local").is_ok() {
        debug!("Loaded .env.local");
    }
    if dotenvy::dotenv().is_ok() {
        debug!("Loaded .env");
    }
}

/// Which language-model backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelBackend {
    /// Local Ollama server.
    #[default]
    Ollama,
    /// Atoma network, OpenAI-compatible API.
    Atoma,
    /// OpenRouter, OpenAI-compatible API.
    OpenRouter,
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Atoma => write!(f, "atoma"),
            Self::OpenRouter => write!(f, "openrouter"),
        }
    }
}

impl FromStr for ModelBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "atoma" => Ok(Self::Atoma),
            "openrouter" => Ok(Self::OpenRouter),
            other => Err(ConfigError::InvalidValue {
                name: "AI_BACKEND".into(),
                message: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Connection settings for the selected model backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    /// Backend kind.
    pub backend: ModelBackend,
    /// Base URL of the backend API.
    pub base_url: Url,
    /// Model identifier.
    pub model: String,
    /// API key, required by the hosted backends.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Process-wide settings, constructed once at start-up and passed down.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Model backend connection.
    pub model: BackendSettings,
    /// Pause between scheduling cycles.
    pub cycle_interval: Duration,
    /// Reject unroutable tasks instead of sending them to the default agent.
    pub strict_routing: bool,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("AI_BACKEND") {
            Some(raw) => raw.parse()?,
            None => ModelBackend::default(),
        };

        let timeout = Duration::from_secs(parse_u64(
            &lookup,
            "ELIZAO_MODEL_TIMEOUT_SECS",
            DEFAULT_MODEL_TIMEOUT_SECS,
        )?);

        let (url_var, default_url, model_var, default_model, key_var) = match backend {
            ModelBackend::Ollama => (
                "OLLAMA_BASE_URL",
                DEFAULT_OLLAMA_URL,
                "OLLAMA_MODEL",
                DEFAULT_MODEL,
                None,
            ),
            ModelBackend::Atoma => (
                "ATOMA_BASE_URL",
                DEFAULT_ATOMA_URL,
                "ATOMA_MODEL",
                DEFAULT_MODEL,
                Some("ATOMA_API_KEY"),
            ),
            ModelBackend::OpenRouter => (
                "OPENROUTER_BASE_URL",
                DEFAULT_OPENROUTER_URL,
                "OPENROUTER_MODEL",
                DEFAULT_OPENROUTER_MODEL,
                Some("OPENROUTER_API_KEY"),
            ),
        };

        let raw_url = lookup(url_var).unwrap_or_else(|| default_url.to_string());
        let base_url = Url::parse(raw_url.trim_end_matches('/')).map_err(|e| {
            ConfigError::InvalidValue {
                name: url_var.into(),
                message: e.to_string(),
            }
        })?;

        let model = BackendSettings {
            backend,
            base_url,
            model: lookup(model_var).unwrap_or_else(|| default_model.to_string()),
            api_key: key_var.and_then(&lookup).filter(|k| !k.is_empty()),
            timeout,
        };

        Ok(Self {
            model,
            cycle_interval: Duration::from_secs(parse_u64(
                &lookup,
                "ELIZAO_CYCLE_INTERVAL_SECS",
                DEFAULT_CYCLE_INTERVAL_SECS,
            )?),
            strict_routing: parse_bool(&lookup, "ELIZAO_STRICT_ROUTING")?,
        })
    }
}

fn parse_u64<F>(lookup: &F, name: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.into(),
            message: format!("expected a whole number, got '{}'", raw),
        }),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, name: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).map(|v| v.trim().to_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off" | "") => Ok(false),
        Some(v) => Err(ConfigError::InvalidValue {
            name: name.into(),
            message: format!("expected a boolean, got '{}'", v),
        }),
    }
}
