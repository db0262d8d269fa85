use std::{env, net::SocketAddr};
use thiserror::Error;

use crate::pagination::MAX_PAGE_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required to start the API server")]
    Missing(&'static str),
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub page_size: usize,
    pub scripturl: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".into());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: raw_addr.clone(),
        })?;
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let page_size = lookup("CATEGORY_PAGE_SIZE")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(20)
            .clamp(1, MAX_PAGE_SIZE);
        let scripturl = lookup("SCRIPT_URL").unwrap_or_else(|| "/categories".into());

        Ok(Self {
            bind_addr,
            jwt_secret,
            page_size,
            scripturl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.scripturl, "/categories");
    }

    #[test]
    fn secret_is_required() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn page_size_is_clamped_and_addr_validated() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "x"),
            ("CATEGORY_PAGE_SIZE", "500"),
        ]))
        .unwrap();
        assert_eq!(config.page_size, 100);

        let err =
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "x"), ("BIND_ADDR", "nowhere")]))
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));
    }
}
