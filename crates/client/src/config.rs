use std::path::PathBuf;
use std::time::Duration;

/// Default backend base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Directory name under the platform data dir.
const DATA_DIR_NAME: &str = "jyotish";

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Where the session token and cached chart are stored.
    pub data_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("No data directory available; set JYOTISH_DATA_DIR")]
    NoDataDir,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                         |
    /// |--------------------------------|---------------------------------|
    /// | `JYOTISH_API_URL`              | `http://localhost:8000`         |
    /// | `JYOTISH_REQUEST_TIMEOUT_SECS` | `30`                            |
    /// | `JYOTISH_DATA_DIR`             | platform data dir + `/jyotish`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("JYOTISH_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs = match lookup("JYOTISH_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "JYOTISH_REQUEST_TIMEOUT_SECS",
                expected: "u64",
                value: raw,
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let data_dir = match lookup("JYOTISH_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join(DATA_DIR_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };

        Ok(Self {
            api_url,
            request_timeout_secs,
            data_dir,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_values_are_used() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("JYOTISH_API_URL", "https://astro.example.com/"),
            ("JYOTISH_REQUEST_TIMEOUT_SECS", "5"),
            ("JYOTISH_DATA_DIR", "/tmp/jyotish-test"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://astro.example.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/jyotish-test"));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config =
            ClientConfig::from_lookup(lookup(&[("JYOTISH_DATA_DIR", "/tmp/jyotish-test")])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("JYOTISH_REQUEST_TIMEOUT_SECS", "soon"),
            ("JYOTISH_DATA_DIR", "/tmp/jyotish-test"),
        ]))
        .unwrap_err();
        assert_matches!(
            err,
            ConfigError::Invalid {
                var: "JYOTISH_REQUEST_TIMEOUT_SECS",
                ..
            }
        );
    }
}
