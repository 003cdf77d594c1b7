use std::net::SocketAddr;

use crate::store::DEFAULT_BATCH_CAPACITY;
use crate::{ClientError, ClientResult};

pub const BIND_ENV: &str = "CREDITLENS_BIND";
pub const ALLOWED_ORIGINS_ENV: &str = "CREDITLENS_ALLOWED_ORIGINS";
pub const MAX_UPLOAD_BYTES_ENV: &str = "CREDITLENS_MAX_UPLOAD_BYTES";
pub const BATCH_CAPACITY_ENV: &str = "CREDITLENS_BATCH_CAPACITY";

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub allowed_origins: AllowedOrigins,
    pub max_upload_bytes: usize,
    pub batch_capacity: usize,
}

/// Values supplied on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub bind: Option<String>,
    pub allowed_origins: Option<String>,
    pub max_upload_bytes: Option<String>,
    pub batch_capacity: Option<String>,
}

impl ServerConfig {
    pub fn resolve(overrides: ServerOverrides) -> ClientResult<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    #[doc(hidden)]
    pub fn resolve_with<F>(overrides: ServerOverrides, env: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |value: Option<String>, key: &str| {
            value
                .or_else(|| env(key))
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let bind_raw = pick(overrides.bind, BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|error| ClientError::invalid_config(BIND_ENV, &bind_raw, &error.to_string()))?;

        let allowed_origins = match pick(overrides.allowed_origins, ALLOWED_ORIGINS_ENV) {
            None => AllowedOrigins::Any,
            Some(raw) if raw.split(',').any(|origin| origin.trim() == "*") => AllowedOrigins::Any,
            Some(raw) => AllowedOrigins::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        };

        let max_upload_bytes = parse_positive(
            pick(overrides.max_upload_bytes, MAX_UPLOAD_BYTES_ENV),
            MAX_UPLOAD_BYTES_ENV,
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;
        let batch_capacity = parse_positive(
            pick(overrides.batch_capacity, BATCH_CAPACITY_ENV),
            BATCH_CAPACITY_ENV,
            DEFAULT_BATCH_CAPACITY,
        )?;

        Ok(Self {
            bind,
            allowed_origins,
            max_upload_bytes,
            batch_capacity,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            allowed_origins: AllowedOrigins::Any,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            batch_capacity: DEFAULT_BATCH_CAPACITY,
        }
    }
}

fn parse_positive(raw: Option<String>, key: &str, default: usize) -> ClientResult<usize> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.parse::<usize>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        Ok(_) => Err(ClientError::invalid_config(key, &value, "must be greater than zero")),
        Err(error) => Err(ClientError::invalid_config(key, &value, &error.to_string())),
    }
}
