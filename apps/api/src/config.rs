use std::str::FromStr;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Redis,
    Postgres,
    S3,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "redis" => Ok(StorageBackend::Redis),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "s3" => Ok(StorageBackend::S3),
            other => bail!("Unknown STORAGE_BACKEND '{other}' (expected memory, redis, postgres or s3)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Backend credentials are only required by the backend that is selected.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub s3: Option<S3Config>,
    pub undo_max_entries: usize,
    pub history_max_entries: usize,
    pub autosave_keep_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            storage_backend: StorageBackend::Memory,
            database_url: None,
            redis_url: None,
            s3: None,
            undo_max_entries: 100,
            history_max_entries: 100,
            autosave_keep_count: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let storage_backend = match optional_env("STORAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => defaults.storage_backend,
        };
        let s3 = s3_from_env(storage_backend)?;

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            storage_backend,
            database_url: optional_env("DATABASE_URL"),
            redis_url: optional_env("REDIS_URL"),
            s3,
            undo_max_entries: parse_env("UNDO_MAX_ENTRIES", defaults.undo_max_entries)?,
            history_max_entries: parse_env("HISTORY_MAX_ENTRIES", defaults.history_max_entries)?,
            autosave_keep_count: parse_env("AUTOSAVE_KEEP_COUNT", defaults.autosave_keep_count)?,
        })
    }
}

/// Reads the S3 settings, but only when S3 is the selected backend.
fn s3_from_env(backend: StorageBackend) -> Result<Option<S3Config>> {
    if backend != StorageBackend::S3 {
        return Ok(None);
    }
    Ok(Some(S3Config {
        bucket: require_env("S3_BUCKET")?,
        endpoint: require_env("S3_ENDPOINT")?,
        region: optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
        secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
    }))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!(" Redis ".parse::<StorageBackend>().unwrap(), StorageBackend::Redis);
        assert_eq!("postgresql".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert!("dynamo".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.autosave_keep_count, 10);
    }

    #[test]
    fn test_s3_settings_ignored_for_other_backends() {
        std::env::set_var("S3_BUCKET", "resumes");
        std::env::set_var("S3_ENDPOINT", "http://localhost:9000");
        std::env::remove_var("AWS_ACCESS_KEY_ID");
        std::env::remove_var("AWS_SECRET_ACCESS_KEY");

        assert!(s3_from_env(StorageBackend::Memory).unwrap().is_none());
        assert!(s3_from_env(StorageBackend::Redis).unwrap().is_none());
        // Selecting S3 without credentials is an error.
        assert!(s3_from_env(StorageBackend::S3).is_err());
    }
}
