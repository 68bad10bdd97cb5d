use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::DeliveryError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    /// When absent, summaries come from the keyword fallback only
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub output_dir: PathBuf,
    pub summary_concurrency: usize,
    pub summary_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        try_load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let openai_model = lookup("OPENAI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let openai_base_url = lookup("OPENAI_BASE_URL")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let output_dir = lookup("RADAR_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output"));

        let summary_concurrency: usize = parse_var(&lookup, "RADAR_SUMMARY_CONCURRENCY", 2)?;
        let timeout_secs: u64 = parse_var(&lookup, "RADAR_SUMMARY_TIMEOUT_SECS", 30)?;

        Ok(Self {
            openai_api_key,
            openai_model,
            openai_base_url,
            output_dir,
            summary_concurrency: summary_concurrency.max(1),
            summary_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// SMTP settings, only read when a digest is actually sent
#[derive(Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self, DeliveryError> {
        try_load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DeliveryError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let server = get("EMAIL_SMTP_SERVER");
        let user = get("EMAIL_SMTP_USER");
        let password = get("EMAIL_SMTP_PASS");

        let (server, user, password) = match (server, user, password) {
            (Some(server), Some(user), Some(password)) => (server, user, password),
            (server, user, password) => {
                let missing = [
                    ("EMAIL_SMTP_SERVER", server.is_none()),
                    ("EMAIL_SMTP_USER", user.is_none()),
                    ("EMAIL_SMTP_PASS", password.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name)
                .collect();
                return Err(DeliveryError::MissingConfig(missing));
            }
        };

        let port = match get("EMAIL_SMTP_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| DeliveryError::InvalidPort(raw.clone()))?,
            None => 587,
        };

        Ok(Self {
            server,
            port,
            user,
            password,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", name, raw)),
        None => Ok(default),
    }
}

fn try_load_dotenv() {
    // Try locations in order of preference:

    // 1. Current directory (for development)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // 2. ~/.config/radar-saude/.env (standard config location)
    if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("radar-saude").join(".env");
        if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
            return;
        }
    }

    // 3. ~/.env (home directory)
    if let Some(home_dir) = dirs::home_dir() {
        let home_path = home_dir.join(".env");
        if home_path.exists() {
            let _ = dotenvy::from_path(&home_path);
        }
    }

    // If none found, that's okay - environment variables might be set system-wide
}
