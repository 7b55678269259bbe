//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::arbiter::gemini::ArbiterConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// PostgreSQL URL; the in-memory store is used when unset
    pub database_url: Option<String>,

    /// Pool size
    pub database_max_connections: u32,

    /// Gemini API key
    pub gemini_api_key: Option<String>,

    pub gemini_model: String,

    pub gemini_endpoint: String,

    /// Upper bound for one arbiter call
    pub arbiter_timeout: Duration,

    pub model_path: PathBuf,

    pub tokenizer_path: PathBuf,

    /// Front-end assets
    pub static_dir: PathBuf,

    /// Largest `/history?limit` honoured
    pub history_max_limit: u32,

    /// `pretty` or `json`
    pub log_format: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            database_url: None,
            database_max_connections: 10,
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_endpoint: "https://generativelanguage.googleapis.com".to_string(),
            arbiter_timeout: Duration::from_secs(15),
            model_path: PathBuf::from("models/url_deep_model.onnx"),
            tokenizer_path: PathBuf::from("models/tokenizer.json"),
            static_dir: PathBuf::from("static"),
            history_max_limit: 100,
            log_format: "pretty".to_string(),
            environment: "development".to_string(),
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parsed("PORT").unwrap_or(defaults.port),

            database_url: non_empty("DATABASE_URL"),

            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .filter(|&n: &u32| n > 0)
                .unwrap_or(defaults.database_max_connections),

            gemini_api_key: non_empty("GEMINI_API_KEY"),

            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),

            gemini_endpoint: non_empty("GEMINI_ENDPOINT").unwrap_or(defaults.gemini_endpoint),

            arbiter_timeout: parsed("ARBITER_TIMEOUT_SECS")
                .filter(|&s: &u64| s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.arbiter_timeout),

            model_path: non_empty("MODEL_PATH").map(PathBuf::from).unwrap_or(defaults.model_path),

            tokenizer_path: non_empty("TOKENIZER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.tokenizer_path),

            static_dir: non_empty("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),

            history_max_limit: parsed("HISTORY_MAX_LIMIT")
                .filter(|&n: &u32| n > 0)
                .unwrap_or(defaults.history_max_limit),

            log_format: non_empty("LOG_FORMAT").unwrap_or(defaults.log_format),

            environment: non_empty("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Arbiter settings derived from this config
    pub fn arbiter(&self) -> ArbiterConfig {
        ArbiterConfig {
            api_key: self.gemini_api_key.clone(),
            model: self.gemini_model.clone(),
            endpoint: self.gemini_endpoint.clone(),
            timeout: self.arbiter_timeout,
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
