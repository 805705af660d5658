//! Process configuration from environment variables

use std::net::SocketAddr;

use anyhow::{anyhow, Context};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = get("TS_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("invalid TS_BIND_ADDR")?;

        let database_url =
            get("TS_DATABASE_URL").ok_or_else(|| anyhow!("TS_DATABASE_URL is not set"))?;
        let redis_url = get("TS_REDIS_URL").ok_or_else(|| anyhow!("TS_REDIS_URL is not set"))?;

        let jwt_secret = get("TS_JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("TS_JWT_SECRET is not set, using the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let token_ttl_hours = match get("TS_TOKEN_TTL_HOURS") {
            Some(value) => value
                .parse::<i64>()
                .context("invalid TS_TOKEN_TTL_HOURS")?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Self {
            bind_addr,
            database_url,
            redis_url,
            jwt_secret,
            token_ttl_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_apply() {
        let env = vars(&[
            ("TS_DATABASE_URL", "postgres://localhost/tasks"),
            ("TS_REDIS_URL", "redis://localhost"),
        ]);
        let config = Config::from_vars(|name| env.get(name).cloned()).unwrap();

        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(config.jwt_secret, DEFAULT_JWT_SECRET);
        assert_eq!(config.token_ttl_hours, DEFAULT_TOKEN_TTL_HOURS);
    }

    #[test]
    fn test_missing_database_url_fails() {
        let env = vars(&[("TS_REDIS_URL", "redis://localhost")]);
        let err = Config::from_vars(|name| env.get(name).cloned()).unwrap_err();
        assert!(err.to_string().contains("TS_DATABASE_URL"));
    }

    #[test]
    fn test_invalid_bind_addr_fails() {
        let env = vars(&[
            ("TS_DATABASE_URL", "postgres://localhost/tasks"),
            ("TS_REDIS_URL", "redis://localhost"),
            ("TS_BIND_ADDR", "not-an-addr"),
        ]);
        assert!(Config::from_vars(|name| env.get(name).cloned()).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let env = vars(&[
            ("TS_DATABASE_URL", "postgres://localhost/tasks"),
            ("TS_REDIS_URL", "redis://localhost"),
            ("TS_BIND_ADDR", "127.0.0.1:9090"),
            ("TS_JWT_SECRET", "secret"),
            ("TS_TOKEN_TTL_HOURS", "24"),
        ]);
        let config = Config::from_vars(|name| env.get(name).cloned()).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.jwt_secret, "secret");
        assert_eq!(config.token_ttl_hours, 24);
    }
}
