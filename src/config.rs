use std::str::FromStr;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "inmemory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown STORAGE_BACKEND '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub demo_username: String,
    pub seed_on_start: bool,
}

fn env_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key}: {e}")),
        _ => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = env_or("STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL is not set; STORAGE_BACKEND=postgres needs a database");
        }
        Ok(Self {
            storage,
            database_url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080)?,
            demo_username: std::env::var("DEMO_USERNAME").unwrap_or_else(|_| "demo_user".into()),
            seed_on_start: env_or("SEED_ON_START", true)?,
        })
    }

    #[cfg(test)]
    pub fn memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database_url: None,
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            demo_username: "demo_user".into(),
            seed_on_start: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!("postgres".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert_eq!(" Memory ".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn missing_variables_use_defaults() {
        assert_eq!(env_or("EATR_TEST_UNSET_PORT", 8080u16).unwrap(), 8080);
        assert!(env_or("EATR_TEST_UNSET_FLAG", true).unwrap());
    }
}
