use anyhow::{Context, Result, anyhow, bail};
use std::{fs, path::Path, str::FromStr, time::Duration};

use crate::fetch::{
    DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT, RetryPolicy,
};
use crate::identifier::DEFAULT_DRIVE_HOST;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/drive2html-env";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub drive_host: Option<String>,
    pub fetch_max_attempts: Option<u32>,
    pub fetch_backoff_ms: Option<u64>,
    pub fetch_max_backoff_ms: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub drive_host: String,
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub user_agent: String,
    pub log_level: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            drive_host: DEFAULT_DRIVE_HOST.to_string(),
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn parse_number<T>(key: &str, value: &str, path: &Path) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("Parsing {key} from {}", path.display()))
}

pub fn read_env_config(path: &Path) -> Result<Option<EnvConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let mut cfg = EnvConfig::default();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key_raw, value_raw)) = trimmed.split_once('=') {
            let key = key_raw.trim();
            let value = value_raw.trim().trim_matches('"');
            match key {
                "DRIVE_HOST" => {
                    if !value.is_empty() {
                        cfg.drive_host = Some(value.to_string());
                    }
                }
                "FETCH_MAX_ATTEMPTS" => {
                    cfg.fetch_max_attempts = Some(parse_number(key, value, path)?);
                }
                "FETCH_BACKOFF_MS" => {
                    cfg.fetch_backoff_ms = Some(parse_number(key, value, path)?);
                }
                "FETCH_MAX_BACKOFF_MS" => {
                    cfg.fetch_max_backoff_ms = Some(parse_number(key, value, path)?);
                }
                "FETCH_TIMEOUT_SECS" => {
                    cfg.fetch_timeout_secs = Some(parse_number(key, value, path)?);
                }
                "USER_AGENT" => {
                    if !value.is_empty() {
                        cfg.user_agent = Some(value.to_string());
                    }
                }
                "LOG_LEVEL" => {
                    if !value.is_empty() {
                        cfg.log_level = Some(value.to_string());
                    }
                }
                _ => {}
            }
        }
    }
    Ok(Some(cfg))
}

impl EnvConfig {
    /// Fills every unset key with its default and validates the result.
    pub fn into_settings(self) -> Result<RuntimeSettings> {
        let defaults = RuntimeSettings::default();
        let max_attempts = self.fetch_max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            bail!("FETCH_MAX_ATTEMPTS must be at least 1");
        }
        let initial_backoff = self
            .fetch_backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_INITIAL_BACKOFF);
        let max_backoff = self
            .fetch_max_backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_MAX_BACKOFF);
        if max_backoff < initial_backoff {
            return Err(anyhow!(
                "FETCH_MAX_BACKOFF_MS ({}ms) is below FETCH_BACKOFF_MS ({}ms)",
                max_backoff.as_millis(),
                initial_backoff.as_millis()
            ));
        }
        if self.fetch_timeout_secs == Some(0) {
            bail!("FETCH_TIMEOUT_SECS must be at least 1");
        }
        Ok(RuntimeSettings {
            drive_host: self.drive_host.unwrap_or(defaults.drive_host),
            retry: RetryPolicy {
                max_attempts,
                initial_backoff,
                max_backoff,
            },
            timeout: self
                .fetch_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            log_level: self.log_level.unwrap_or(defaults.log_level),
        })
    }
}

/// Loads the env file at `path`; a missing file means all defaults.
pub fn load_settings_from(path: impl AsRef<Path>) -> Result<RuntimeSettings> {
    let path = path.as_ref();
    read_env_config(path)?
        .unwrap_or_default()
        .into_settings()
        .with_context(|| format!("Invalid settings in {}", path.display()))
}
