use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::cli::Cli;
use crate::lang::parse_language_tag;
use crate::wikidata::MAX_ATTEMPTS;

pub const DEFAULT_ENDPOINT: &str = "https://query.wikidata.org/sparql";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_FALLBACK_LANGUAGE: &str = "en";
const DEFAULT_CORPUS_DIR: &str = "corpora";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },

    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be between 1 and {max}, got '{value}'")]
    OutOfRange {
        key: &'static str,
        value: String,
        max: u32,
    },

    #[error("invalid fallback language '{0}': expected a language code such as en")]
    InvalidFallbackLanguage(String),
}

/// Runtime settings.
///
/// Environment variables (all optional):
/// - `LANGDATA_ENDPOINT`: SPARQL endpoint URL
/// - `LANGDATA_TIMEOUT_SECS`: per-request timeout
/// - `LANGDATA_MAX_RETRIES`: total attempts for transient failures, at most `MAX_ATTEMPTS`
/// - `LANGDATA_FALLBACK_LANG`: label language used when the requested one has none
/// - `LANGDATA_CORPUS_DIR`: directory of autosuggestion corpora
///
/// Command-line flags take precedence over the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: Url,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub fallback_language: String,
    pub corpus_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let endpoint = match var("LANGDATA_ENDPOINT") {
            Some(raw) => parse_endpoint(&raw)?,
            None => parse_endpoint(DEFAULT_ENDPOINT)?,
        };
        let timeout = match var("LANGDATA_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("LANGDATA_TIMEOUT_SECS", &raw)?),
            None => DEFAULT_TIMEOUT,
        };
        let max_attempts = match var("LANGDATA_MAX_RETRIES") {
            Some(raw) => parse_attempts("LANGDATA_MAX_RETRIES", &raw)?,
            None => DEFAULT_MAX_ATTEMPTS,
        };
        let fallback_language = match var("LANGDATA_FALLBACK_LANG") {
            Some(raw) => parse_fallback(&raw)?,
            None => DEFAULT_FALLBACK_LANGUAGE.to_string(),
        };
        let corpus_dir = var("LANGDATA_CORPUS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CORPUS_DIR));

        Ok(Self {
            endpoint,
            timeout,
            max_attempts,
            fallback_language,
            corpus_dir,
        })
    }

    pub fn with_overrides(mut self, cli: &Cli) -> Result<Self, ConfigError> {
        if let Some(ref raw) = cli.endpoint {
            self.endpoint = parse_endpoint(raw)?;
        }
        if let Some(secs) = cli.timeout {
            if secs == 0 {
                return Err(ConfigError::InvalidNumber {
                    key: "--timeout",
                    value: secs.to_string(),
                });
            }
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = cli.retries {
            self.max_attempts = check_attempts("--retries", attempts)?;
        }
        if let Some(ref raw) = cli.fallback_lang {
            self.fallback_language = parse_fallback(raw)?;
        }
        if let Some(ref dir) = cli.corpus_dir {
            self.corpus_dir = dir.clone();
        }
        Ok(self)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        })
}

fn parse_attempts(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let n = parse_positive(key, raw)?;
    match u32::try_from(n) {
        Ok(n) => check_attempts(key, n),
        Err(_) => Err(ConfigError::OutOfRange {
            key,
            value: raw.to_string(),
            max: MAX_ATTEMPTS,
        }),
    }
}

fn check_attempts(key: &'static str, attempts: u32) -> Result<u32, ConfigError> {
    if (1..=MAX_ATTEMPTS).contains(&attempts) {
        Ok(attempts)
    } else {
        Err(ConfigError::OutOfRange {
            key,
            value: attempts.to_string(),
            max: MAX_ATTEMPTS,
        })
    }
}

fn parse_fallback(raw: &str) -> Result<String, ConfigError> {
    parse_language_tag(raw).ok_or_else(|| ConfigError::InvalidFallbackLanguage(raw.to_string()))
}
