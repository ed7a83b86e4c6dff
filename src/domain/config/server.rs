use std::{path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

pub const DEFAULT_RETENTION_SECS: u64 = 3600;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    /// Files older than this are purged by the sweeper.
    pub retention: Duration,
    pub sweep_interval: Duration,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            upload_dir: PathBuf::from("uploads"),
            retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            max_upload_bytes: 1024 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `UPLOAD_DIR`, `RETENTION_SECS`, `SWEEP_INTERVAL_SECS`
    /// and `MAX_UPLOAD_BYTES`, keeping the default for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            retention: Duration::from_secs(parse_or(
                &lookup,
                "RETENTION_SECS",
                DEFAULT_RETENTION_SECS,
            )?),
            sweep_interval: Duration::from_secs(non_zero(parse_or(
                &lookup,
                "SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )?)?),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn non_zero(secs: u64) -> Result<u64, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key: "SWEEP_INTERVAL_SECS",
            value: secs.to_string(),
        });
    }
    Ok(secs)
}
