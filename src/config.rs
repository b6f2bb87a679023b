use std::time::Duration;

use anyhow::{Context, Result};

/// Runtime configuration, read once at startup. Everything except the API
/// key has a production default and can be overridden via environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub primary_model: String,
    pub backup_model: String,
    /// Attempts on the primary model before escalating to the backup.
    pub gen_retries: u32,
    /// Fixed wait between primary-model attempts after a transient failure.
    pub gen_backoff: Duration,
    /// Per-request timeout for the generation and translation services.
    pub request_timeout: Duration,
    pub kb_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_key = dotenv::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .context("GEMINI_API_KEY not set — the generation service credential is required")?;

        let primary_model = dotenv::var("HEALTHLINGO_PRIMARY_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let backup_model = dotenv::var("HEALTHLINGO_BACKUP_MODEL")
            .unwrap_or_else(|_| "gemini-1.5-flash".to_string());

        let gen_retries = dotenv::var("HEALTHLINGO_GEN_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(2)
            .max(1);
        let gen_backoff_ms = dotenv::var("HEALTHLINGO_GEN_BACKOFF_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1500);
        let timeout_secs = dotenv::var("HEALTHLINGO_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let kb_path =
            dotenv::var("HEALTHLINGO_KB_PATH").unwrap_or_else(|_| "faqs.json".to_string());

        Ok(Self {
            api_key,
            primary_model,
            backup_model,
            gen_retries,
            gen_backoff: Duration::from_millis(gen_backoff_ms),
            request_timeout: Duration::from_secs(timeout_secs),
            kb_path,
        })
    }
}
