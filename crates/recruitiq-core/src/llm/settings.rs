use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Backends able to answer analysis prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Gemini,
    Noop,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "noop" => Ok(Self::Noop),
            other => bail!("unsupported model provider `{other}` (expected gemini or noop)"),
        }
    }
}

/// Environment-driven configuration for the model client and input tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSettings {
    pub provider: ProviderKind,
    pub api_key: String,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub pdftoppm: Option<PathBuf>,
}

impl ModelSettings {
    pub const PROVIDER_ENV: &'static str = "RECRUITIQ_PROVIDER";
    pub const API_KEY_ENV: &'static str = "GOOGLE_API_KEY";
    pub const ENDPOINT_ENV: &'static str = "RECRUITIQ_ENDPOINT";
    pub const MODEL_ENV: &'static str = "RECRUITIQ_MODEL";
    pub const TIMEOUT_ENV: &'static str = "RECRUITIQ_TIMEOUT_SECS";
    pub const PDFTOPPM_ENV: &'static str = "RECRUITIQ_PDFTOPPM";

    /// Load settings from environment variables.
    ///
    /// * `RECRUITIQ_PROVIDER` — `gemini` (default) or `noop`.
    /// * `GOOGLE_API_KEY`     — API key (required for `gemini`).
    /// * `RECRUITIQ_ENDPOINT` — Optional custom base URL.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Same as [`ModelSettings::from_env`] but reading from an explicit map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let non_blank = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match non_blank(Self::PROVIDER_ENV) {
            Some(raw) => raw
                .parse::<ProviderKind>()
                .with_context(|| format!("invalid {}", Self::PROVIDER_ENV))?,
            None => ProviderKind::default(),
        };
        let api_key = match provider {
            ProviderKind::Noop => non_blank(Self::API_KEY_ENV).unwrap_or_default(),
            ProviderKind::Gemini => non_blank(Self::API_KEY_ENV).with_context(|| {
                format!(
                    "environment variable {} must be set to call Gemini",
                    Self::API_KEY_ENV
                )
            })?,
        };
        let timeout_secs = match non_blank(Self::TIMEOUT_ENV) {
            Some(raw) => Some(raw.parse::<u64>().with_context(|| {
                format!("{} must be a whole number of seconds", Self::TIMEOUT_ENV)
            })?),
            None => None,
        };

        Ok(Self {
            provider,
            api_key,
            endpoint: non_blank(Self::ENDPOINT_ENV),
            model: non_blank(Self::MODEL_ENV),
            timeout_secs,
            pdftoppm: non_blank(Self::PDFTOPPM_ENV).map(PathBuf::from),
        })
    }
}
