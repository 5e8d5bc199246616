use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use tracing::info;

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub cors_origin: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: load("FANIKO_HOST", "0.0.0.0")?,
            port: load("FANIKO_PORT", "4000")?,
            uploads_dir: load::<String>("FANIKO_UPLOADS_DIR", "./uploads")?.into(),
            cors_origin: load("FANIKO_CORS_ORIGIN", "http://localhost:5173")?,
            max_upload_bytes: upload_limit(load("FANIKO_MAX_UPLOAD_MB", "100")?)?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn upload_limit(megabytes: usize) -> Result<usize> {
    megabytes
        .checked_mul(1024 * 1024)
        .with_context(|| format!("FANIKO_MAX_UPLOAD_MB {megabytes} is too large"))
}

fn load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse::<T>()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Invalid {key} value {raw:?}"))
}
