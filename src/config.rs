// Configuration: the API key and the base URL of the ChatPDF API.
// Values come from the environment (a `.env` file is honoured), and the
// API key falls back to an interactive prompt when it is not set.

use anyhow::Result;
use dialoguer::Password;

pub const DEFAULT_BASE_URL: &str = "https://api.chatpdf.com/v1";
pub const API_KEY_VAR: &str = "CHATPDF_API_KEY";
pub const BASE_URL_VAR: &str = "CHATPDF_BASE_URL";

/// Process-wide settings, built once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
}

impl Config {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Config {
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build the config from the environment, prompting for the API key
    /// when `CHATPDF_API_KEY` is missing or empty. An empty answer is
    /// accepted; the server will reject it on the first call.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let base_url = base_url_from(std::env::var(BASE_URL_VAR).ok());
        let api_key = match api_key_from(std::env::var(API_KEY_VAR).ok()) {
            Some(key) => key,
            None => Password::new()
                .with_prompt("ChatPDF APIキーを入力してください")
                .allow_empty_password(true)
                .interact()?,
        };
        Ok(Config::new(api_key, base_url))
    }
}

fn api_key_from(var: Option<String>) -> Option<String> {
    var.filter(|k| !k.is_empty())
}

fn base_url_from(var: Option<String>) -> String {
    match var {
        Some(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => DEFAULT_BASE_URL.to_string(),
    }
}
