use std::time::Duration;

use crate::api_connection::endpoints::{DEFAULT_MODEL, GROQ_BASE_URL};
use crate::cli::Cli;

pub const DEFAULT_FRONTEND_ORIGIN: &str = "https://eco-track-ai-frontend.vercel.app";

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

/// Process-wide settings, resolved once at startup and handed to constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_origin: String,
    pub llm: LlmConfig,
    /// `None` when `SUPABASE_URL` or `SUPABASE_ANON_KEY` is missing.
    pub store: Option<StoreConfig>,
}

impl AppConfig {
    pub fn from_env(cli: &Cli) -> Self {
        Self::from_lookup(cli, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let llm = LlmConfig {
            api_key: var("GROQ_API_KEY"),
            model: var("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: var("GROQ_BASE_URL").unwrap_or_else(|| GROQ_BASE_URL.to_string()),
            timeout: Duration::from_secs(cli.llm_timeout_secs),
        };

        let store = match (var("SUPABASE_URL"), var("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(StoreConfig {
                url,
                anon_key,
                timeout: Duration::from_secs(cli.store_timeout_secs),
            }),
            _ => None,
        };

        Self {
            host: cli.host.clone(),
            port: cli.port,
            frontend_origin: var("FRONTEND_ORIGIN")
                .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string()),
            llm,
            store,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
