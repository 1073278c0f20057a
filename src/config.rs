use std::env;

use dotenvy::dotenv;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub metrics_port: u16,
    /// Load the demo user and their orders on startup. The catalog is always
    /// present.
    pub seed_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            metrics_port: 9090,
            seed_data: true,
        }
    }
}

impl AppConfig {
    /// Read from the environment, after loading `.env` if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = parse(&lookup, "SERVER_PORT", defaults.server_port)?;
        let metrics_port = parse(&lookup, "METRICS_PORT", defaults.metrics_port)?;
        let seed_data = parse(&lookup, "SEED_DATA", defaults.seed_data)?;

        if server_port == metrics_port {
            return Err(ConfigError::Invalid {
                name: "METRICS_PORT",
                reason: format!("must differ from SERVER_PORT ({})", server_port),
            });
        }

        tracing::info!("Application configuration loaded successfully.");
        Ok(Self {
            server_host,
            server_port,
            metrics_port,
            seed_data,
        })
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
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
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server_port, 3000);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SERVER_HOST", "0.0.0.0"),
            ("SERVER_PORT", "8080"),
            ("SEED_DATA", "false"),
        ]))
        .unwrap();

        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.metrics_port, 9090);
        assert!(!config.seed_data);
    }

    #[test]
    fn test_invalid_port() {
        let err = AppConfig::from_lookup(lookup(&[("SERVER_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SERVER_PORT", .. }));
    }

    #[test]
    fn test_invalid_flag() {
        let err = AppConfig::from_lookup(lookup(&[("SEED_DATA", "yes")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SEED_DATA", .. }));
    }

    #[test]
    fn test_ports_must_differ() {
        let err = AppConfig::from_lookup(lookup(&[("METRICS_PORT", "3000")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "METRICS_PORT", .. }));
    }
}
