use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_SEARCH_PATH: &str = "/search";
pub const DEFAULT_QUERY_PARAM: &str = "s";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Where and how to reach the search service.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub search_path: String,
    pub query_param: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> ClientConfig {
        ClientConfig {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> ClientConfig {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub client: ClientConfig,
    pub bind: SocketAddr,
}

impl Config {
    /// Reads the process environment, loading `.env` first if there is one.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = get_env(&lookup, "SEARCH_BACKEND_URL")?;
        let search_path = get_env_or_default(&lookup, "SEARCH_PATH", DEFAULT_SEARCH_PATH);
        let search_path = if search_path.starts_with('/') {
            search_path
        } else {
            format!("/{search_path}")
        };

        let timeout = match lookup("SEARCH_TIMEOUT_SECS") {
            Some(secs) => Some(Duration::from_secs(
                secs.trim()
                    .parse::<u64>()
                    .with_context(|| format!("SEARCH_TIMEOUT_SECS is not a number: {secs}"))?,
            )),
            None => None,
        };

        let bind = get_env_or_default(&lookup, "DUCKSEARCH_BIND", DEFAULT_BIND);
        let bind = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("DUCKSEARCH_BIND is not a socket address: {bind}"))?;

        let mut client = ClientConfig::new(base_url);
        client.search_path = search_path;
        client.query_param = get_env_or_default(&lookup, "SEARCH_QUERY_PARAM", DEFAULT_QUERY_PARAM);
        client.timeout = timeout;

        Ok(Config { client, bind })
    }
}

fn get_env<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("Missing required environment variable: {key}"))
}

fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[(
            "SEARCH_BACKEND_URL",
            "http://localhost:3333/",
        )]))
        .unwrap();

        assert_eq!(config.client.base_url, "http://localhost:3333");
        assert_eq!(config.client.endpoint(), "http://localhost:3333/search");
        assert_eq!(config.client.query_param, "s");
        assert_eq!(config.client.timeout, None);
        assert_eq!(config.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SEARCH_BACKEND_URL", "http://search.internal"),
            ("SEARCH_PATH", "api/v2/search"),
            ("SEARCH_QUERY_PARAM", "q"),
            ("SEARCH_TIMEOUT_SECS", "5"),
            ("DUCKSEARCH_BIND", "0.0.0.0:9000"),
        ]))
        .unwrap();

        assert_eq!(config.client.endpoint(), "http://search.internal/api/v2/search");
        assert_eq!(config.client.query_param, "q");
        assert_eq!(config.client.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.bind.port(), 9000);
    }

    #[test]
    fn test_missing_backend_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("SEARCH_BACKEND_URL"));

        let err = Config::from_lookup(lookup_from(&[("SEARCH_BACKEND_URL", "  ")])).unwrap_err();
        assert!(err.to_string().contains("SEARCH_BACKEND_URL"));
    }

    #[test]
    fn test_bad_timeout() {
        let err = Config::from_lookup(lookup_from(&[
            ("SEARCH_BACKEND_URL", "http://localhost:3333"),
            ("SEARCH_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("SEARCH_TIMEOUT_SECS"));
    }
}
