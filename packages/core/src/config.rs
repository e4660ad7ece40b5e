use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::analysis::DEFAULT_ANALYSIS_TIMEOUT;
use crate::cli::Cli;
use crate::services::gemini::{GEMINI_DEFAULT_BASE_URL, GEMINI_DEFAULT_MODEL};
use crate::services::openai::{OPENAI_DEFAULT_BASE_URL, OPENAI_DEFAULT_MODEL};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub provider: AnalysisProvider,
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
    pub analysis_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisProvider {
    Gemini,
    OpenAi,
}

impl AnalysisProvider {
    fn api_key_var(&self) -> &'static str {
        match self {
            AnalysisProvider::Gemini => "GEMINI_API_KEY",
            AnalysisProvider::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            AnalysisProvider::Gemini => GEMINI_DEFAULT_BASE_URL,
            AnalysisProvider::OpenAi => OPENAI_DEFAULT_BASE_URL,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            AnalysisProvider::Gemini => GEMINI_DEFAULT_MODEL,
            AnalysisProvider::OpenAi => OPENAI_DEFAULT_MODEL,
        }
    }
}

impl FromStr for AnalysisProvider {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gemini" => Ok(AnalysisProvider::Gemini),
            "openai" => Ok(AnalysisProvider::OpenAi),
            other => Err(format!("Invalid ANALYSIS_PROVIDER: {}", other)),
        }
    }
}

impl Config {
    /// Build from the environment, letting CLI flags take precedence.
    pub fn from_env_and_cli(cli: &Cli) -> Result<Self, String> {
        let mut config = Self::from_lookup(|key| match key {
            "ANALYSIS_PROVIDER" => cli.provider.clone().or_else(|| env::var(key).ok()),
            "BIND_ADDR" => cli.bind.clone().or_else(|| env::var(key).ok()),
            "ANALYSIS_MODEL" => cli.model.clone().or_else(|| env::var(key).ok()),
            _ => env::var(key).ok(),
        })?;

        if let Some(seconds) = cli.analysis_timeout {
            config.analysis_timeout = Duration::from_secs(seconds);
        }

        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => parse_bind_addr(&raw)?,
            None => parse_bind_addr(DEFAULT_BIND_ADDR)?,
        };

        let provider = match lookup("ANALYSIS_PROVIDER") {
            Some(raw) => raw.parse::<AnalysisProvider>()?,
            None => AnalysisProvider::Gemini,
        };

        let api_key = lookup(provider.api_key_var()).filter(|key| !key.is_empty());

        let api_base_url = lookup("ANALYSIS_API_URL")
            .unwrap_or_else(|| provider.default_base_url().to_string());

        let model =
            lookup("ANALYSIS_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let analysis_timeout = match lookup("ANALYSIS_TIMEOUT_SECONDS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .map_err(|_| "ANALYSIS_TIMEOUT_SECONDS must be a valid number")?,
            ),
            None => DEFAULT_ANALYSIS_TIMEOUT,
        };

        Ok(Self {
            bind_addr,
            provider,
            api_key,
            api_base_url,
            model,
            analysis_timeout,
        })
    }
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr, String> {
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("Invalid BIND_ADDR: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_gemini_without_key() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.provider, AnalysisProvider::Gemini);
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, GEMINI_DEFAULT_MODEL);
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.analysis_timeout, DEFAULT_ANALYSIS_TIMEOUT);
    }

    #[test]
    fn openai_reads_its_own_key_and_defaults() {
        let config = config_from(&[
            ("ANALYSIS_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "sk-1"),
            ("GEMINI_API_KEY", "g-1"),
        ])
        .unwrap();
        assert_eq!(config.provider, AnalysisProvider::OpenAi);
        assert_eq!(config.api_key.as_deref(), Some("sk-1"));
        assert_eq!(config.api_base_url, OPENAI_DEFAULT_BASE_URL);
        assert_eq!(config.model, OPENAI_DEFAULT_MODEL);
    }

    #[test]
    fn empty_key_counts_as_missing() {
        let config = config_from(&[("GEMINI_API_KEY", "")]).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config_from(&[("ANALYSIS_PROVIDER", "claude")]).is_err());
        assert!(config_from(&[("ANALYSIS_TIMEOUT_SECONDS", "soon")]).is_err());
        assert!(config_from(&[("BIND_ADDR", "not-an-addr")]).is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("ANALYSIS_API_URL", "http://localhost:9999"),
            ("ANALYSIS_MODEL", "gemini-2.0-flash"),
            ("ANALYSIS_TIMEOUT_SECONDS", "3"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.api_base_url, "http://localhost:9999");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.analysis_timeout, Duration::from_secs(3));
    }
}
