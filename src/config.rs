//! Runtime configuration.
//!
//! Read from the process environment (after `.env` is loaded). Only the
//! Gemini API key is required; everything else has a default.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::gemini::{DEFAULT_API_URL, DEFAULT_MODEL};

const DEFAULT_KNOWLEDGE_DIR: &str = "knowledge";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024; // 50MB
// Roughly the 1M-token context window of the Flash models.
const DEFAULT_MAX_PROMPT_CHARS: usize = 3_000_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub gemini_timeout: Duration,
    /// Directory holding the reference PDFs.
    pub knowledge_dir: PathBuf,
    pub bind_addr: String,
    /// Request body limit, applied to uploads.
    pub max_upload_bytes: usize,
    /// Assembled prompts longer than this (in characters) are rejected.
    pub max_prompt_chars: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("GEMINI_API_KEY environment variable not set")?;

        let timeout_secs: u64 = parse_or(&lookup, "GEMINI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_url: lookup("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            gemini_timeout: Duration::from_secs(timeout_secs),
            knowledge_dir: lookup("KNOWLEDGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_KNOWLEDGE_DIR)),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            max_prompt_chars: parse_or(&lookup, "MAX_PROMPT_CHARS", DEFAULT_MAX_PROMPT_CHARS)?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = AppConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "secret")])).unwrap();

        assert_eq!(config.gemini_api_key, "secret");
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.gemini_api_url, DEFAULT_API_URL);
        assert_eq!(config.gemini_timeout, Duration::from_secs(300));
        assert_eq!(config.knowledge_dir, PathBuf::from("knowledge"));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.max_prompt_chars, 3_000_000);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("KNOWLEDGE_DIR", "/srv/knowledge"),
            ("MAX_PROMPT_CHARS", " 1000 "),
            ("GEMINI_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.knowledge_dir, PathBuf::from("/srv/knowledge"));
        assert_eq!(config.max_prompt_chars, 1000);
        assert_eq!(config.gemini_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_or_blank_api_key_fails() {
        assert!(AppConfig::from_lookup(lookup_from(&[])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("MAX_UPLOAD_BYTES", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("MAX_UPLOAD_BYTES"));
    }
}
