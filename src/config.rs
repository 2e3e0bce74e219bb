//! Process configuration read from environment variables.
//!
//! [`ExchangeSettings::from_env`] reads the process environment;
//! [`ExchangeSettings::from_lookup`] takes any key lookup so tests can feed
//! a map instead.

use crate::completion::domain::{ProviderKind, ProviderSettings};
use crate::coordination::services::DEFAULT_SESSION_DEADLINE;
use crate::planner::adapters::DEFAULT_MBTA_BASE_URL;
use crate::routing::services::{ClassifierSettings, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::transport::domain::TransportKind;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Address the HTTP surface binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
/// Fast-path call timeout when none is configured.
pub const DEFAULT_FAST_TIMEOUT: Duration = Duration::from_secs(5);
/// Agent id used when none is configured.
pub const DEFAULT_AGENT_ID: &str = "transit-agent";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value of the wrong shape.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// What was expected.
        reason: String,
    },

    /// A provider was selected without its API key.
    #[error("{provider} selected by LLM_PROVIDER but {key} is not set")]
    MissingApiKey {
        /// Selected provider.
        provider: &'static str,
        /// Variable that must hold the key.
        key: &'static str,
    },
}

/// Transit data source settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitDataSettings {
    /// Base URL of the v3 API.
    pub base_url: String,
    /// Optional API key.
    pub api_key: Option<String>,
}

/// Settings for a capability agent process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// Directory id the agent registers under.
    pub id: String,
    /// Endpoint advertised to the directory.
    pub endpoint: Option<String>,
    /// Address of the multiplexed stream listener, if enabled.
    pub stream_addr: Option<SocketAddr>,
}

/// Complete process configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeSettings {
    /// HTTP bind address.
    pub bind_addr: SocketAddr,
    /// Remote directory base URL; `None` runs the directory in-process.
    pub directory_url: Option<String>,
    /// Transport variant used to reach agents.
    pub transport: TransportKind,
    /// Coordination session deadline.
    pub session_deadline: Duration,
    /// Fast-path call timeout.
    pub fast_timeout: Duration,
    /// Classifier tunables.
    pub classifier: ClassifierSettings,
    /// Completion backend, when a key is configured.
    pub completion: Option<ProviderSettings>,
    /// Transit data source.
    pub transit: TransitDataSettings,
    /// Agent process settings.
    pub agent: AgentSettings,
}

impl ExchangeSettings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = parse_addr(
            "EXCHANGE_BIND_ADDR",
            &get("EXCHANGE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
        )?;
        let transport = match get("EXCHANGE_TRANSPORT") {
            Some(raw) => raw
                .parse::<TransportKind>()
                .map_err(|err| ConfigError::Invalid {
                    key: "EXCHANGE_TRANSPORT",
                    value: raw.clone(),
                    reason: err.to_string(),
                })?,
            None => TransportKind::default(),
        };
        let confidence_threshold = get("EXCHANGE_CONFIDENCE_THRESHOLD")
            .map(|raw| parse_unit_interval("EXCHANGE_CONFIDENCE_THRESHOLD", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

        Ok(Self {
            bind_addr,
            directory_url: get("DIRECTORY_URL"),
            transport,
            session_deadline: millis(&get, "EXCHANGE_SESSION_DEADLINE_MS", DEFAULT_SESSION_DEADLINE)?,
            fast_timeout: millis(&get, "EXCHANGE_FAST_TIMEOUT_MS", DEFAULT_FAST_TIMEOUT)?,
            classifier: ClassifierSettings {
                timeout: millis(
                    &get,
                    "EXCHANGE_CLASSIFIER_TIMEOUT_MS",
                    ClassifierSettings::default().timeout,
                )?,
                confidence_threshold,
            },
            completion: completion_settings(&get)?,
            transit: TransitDataSettings {
                base_url: get("MBTA_BASE_URL").unwrap_or_else(|| DEFAULT_MBTA_BASE_URL.to_owned()),
                api_key: get("MBTA_API_KEY"),
            },
            agent: AgentSettings {
                id: get("AGENT_ID").unwrap_or_else(|| DEFAULT_AGENT_ID.to_owned()),
                endpoint: get("AGENT_ENDPOINT"),
                stream_addr: get("AGENT_STREAM_ADDR")
                    .map(|raw| parse_addr("AGENT_STREAM_ADDR", &raw))
                    .transpose()?,
            },
        })
    }
}

fn completion_settings(
    get: &impl Fn(&str) -> Option<String>,
) -> Result<Option<ProviderSettings>, ConfigError> {
    let anthropic = get("ANTHROPIC_API_KEY");
    let openai = get("OPENAI_API_KEY");

    let kind = match get("LLM_PROVIDER") {
        Some(raw) => Some(raw.parse::<ProviderKind>().map_err(|err| ConfigError::Invalid {
            key: "LLM_PROVIDER",
            value: raw.clone(),
            reason: err.to_string(),
        })?),
        None if anthropic.is_some() => Some(ProviderKind::Anthropic),
        None if openai.is_some() => Some(ProviderKind::OpenAi),
        None => None,
    };
    let Some(provider) = kind else {
        return Ok(None);
    };

    let (key_var, key, model_var) = match provider {
        ProviderKind::Anthropic => ("ANTHROPIC_API_KEY", anthropic, "ANTHROPIC_MODEL"),
        ProviderKind::OpenAi => ("OPENAI_API_KEY", openai, "OPENAI_MODEL"),
    };
    let api_key = key.ok_or(ConfigError::MissingApiKey {
        provider: provider.as_str(),
        key: key_var,
    })?;
    Ok(Some(ProviderSettings {
        kind: provider,
        api_key,
        model: get(model_var).unwrap_or_else(|| provider.default_model().to_owned()),
    }))
}

fn millis(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "must be greater than zero".to_owned(),
        }),
        Ok(value) => Ok(Duration::from_millis(value)),
        Err(err) => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: err.to_string(),
        }),
    }
}

fn parse_addr(key: &'static str, raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|err: std::net::AddrParseError| ConfigError::Invalid {
        key,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}

fn parse_unit_interval(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    let value: f64 = raw.parse().map_err(|err: std::num::ParseFloatError| ConfigError::Invalid {
        key,
        value: raw.to_owned(),
        reason: err.to_string(),
    })?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: raw.to_owned(),
            reason: "must be between 0 and 1".to_owned(),
        })
    }
}
