use std::path::PathBuf;

use anyhow::{Context, Result};

/// Used only when `SOLACE_ENCRYPTION_KEY` is unset. Never rely on it for real data.
pub const DEV_ENCRYPTION_KEY: &str = "dev-key-change-me";

#[derive(Debug)]
pub struct Config {
    pub encryption_key: Option<String>,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("SOLACE_PORT").unwrap_or_else(|| "3000".into());
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid SOLACE_PORT '{}'", port))?;

        Ok(Self {
            encryption_key: lookup("SOLACE_ENCRYPTION_KEY").filter(|k| !k.is_empty()),
            db_path: PathBuf::from(lookup("SOLACE_DB_PATH").unwrap_or_else(|| "solace.db".into())),
            host: lookup("SOLACE_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.encryption_key, None);
        assert_eq!(config.db_path, PathBuf::from("solace.db"));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SOLACE_ENCRYPTION_KEY", "s3cret"),
            ("SOLACE_DB_PATH", "/tmp/j.db"),
            ("SOLACE_PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.encryption_key.as_deref(), Some("s3cret"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/j.db"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn empty_key_counts_as_unset() {
        let config = Config::from_lookup(lookup(&[("SOLACE_ENCRYPTION_KEY", "")])).unwrap();
        assert_eq!(config.encryption_key, None);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("SOLACE_PORT", "http")])).is_err());
    }
}
