use crate::v1beta::{API_BASE, live::DEFAULT_WS_ENDPOINT, video::DEFAULT_POLL_INTERVAL};
use derive_new::new;
use derive_setters::Setters;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const API_BASE_VAR: &str = "GEMINI_API_BASE";
pub const LIVE_ENDPOINT_VAR: &str = "GEMINI_LIVE_ENDPOINT";
pub const OUTPUT_DIR_VAR: &str = "GEMINI_OUTPUT_DIR";
pub const POLL_INTERVAL_VAR: &str = "GEMINI_POLL_INTERVAL_SECS";

#[derive(Debug, Error)]
pub enum Error {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {name} has an invalid value: {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

/// Client context shared by every call: credentials, endpoints and output location.
#[derive(Clone, new, Setters)]
#[setters(prefix = "with_", into)]
pub struct Config {
    #[setters(skip)]
    #[new(into)]
    api_key: String,
    #[new(value = "API_BASE.to_string()")]
    api_base: String,
    #[new(value = "DEFAULT_WS_ENDPOINT.to_string()")]
    live_endpoint: String,
    #[new(value = "PathBuf::from(\"generated\")")]
    output_dir: PathBuf,
    #[new(value = "DEFAULT_POLL_INTERVAL")]
    poll_interval: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Only the API key is required.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(Error::MissingVar(API_KEY_VAR))?;
        let mut config = Self::new(api_key);

        if let Some(base) = lookup(API_BASE_VAR) {
            config.api_base = base;
        }
        if let Some(endpoint) = lookup(LIVE_ENDPOINT_VAR) {
            config.live_endpoint = endpoint;
        }
        if let Some(dir) = lookup(OUTPUT_DIR_VAR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(POLL_INTERVAL_VAR) {
            let parsed = secs.trim().parse::<u64>().map_err(|_| Error::InvalidVar {
                name: POLL_INTERVAL_VAR,
                value: secs.clone(),
            })?;
            config.poll_interval = Duration::from_secs(parsed);
        }

        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn live_endpoint(&self) -> &str {
        &self.live_endpoint
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("live_endpoint", &self.live_endpoint)
            .field("output_dir", &self.output_dir)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_with_only_a_key() {
        let config = Config::from_lookup(lookup(&[(API_KEY_VAR, "secret")])).unwrap();
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.api_base(), API_BASE);
        assert_eq!(config.poll_interval(), Duration::from_secs(20));
        assert_eq!(config.output_dir(), &PathBuf::from("generated"));
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "")])).unwrap_err();
        assert!(matches!(err, Error::MissingVar(API_KEY_VAR)));
    }

    #[test]
    fn overrides_and_invalid_interval() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_VAR, "k"),
            (OUTPUT_DIR_VAR, "/tmp/out"),
            (POLL_INTERVAL_VAR, "1"),
        ]))
        .unwrap();
        assert_eq!(config.output_dir(), &PathBuf::from("/tmp/out"));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));

        let err =
            Config::from_lookup(lookup(&[(API_KEY_VAR, "k"), (POLL_INTERVAL_VAR, "soon")]))
                .unwrap_err();
        assert!(matches!(err, Error::InvalidVar { .. }));
    }
}
