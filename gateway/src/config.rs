use std::time::Duration;

use shared_types::DEFAULT_PROXY_PATH;

#[derive(Debug, Clone)]
pub struct Config {
    /// Interface the gateway binds to
    pub host: String,
    /// Port the gateway listens on
    pub port: u16,
    /// Mount path of the forwarding endpoint, e.g. `/gtm`.
    pub proxy_path: String,
    /// Upper bound for a whole upstream exchange, body included.
    pub upstream_timeout: Duration,
    /// Upper bound for establishing the upstream connection.
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            proxy_path: DEFAULT_PROXY_PATH.to_string(),
            upstream_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            host: env_str("GATEWAY_HOST", &defaults.host),
            port: env_parse("GATEWAY_PORT", defaults.port)?,
            proxy_path: normalize_proxy_path(&env_str("GATEWAY_PROXY_PATH", DEFAULT_PROXY_PATH))?,
            upstream_timeout: Duration::from_secs(env_parse(
                "GATEWAY_UPSTREAM_TIMEOUT_SECS",
                defaults.upstream_timeout.as_secs(),
            )?),
            connect_timeout: Duration::from_secs(env_parse(
                "GATEWAY_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout.as_secs(),
            )?),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Canonical form is a single leading `/` and no trailing `/`.
pub fn normalize_proxy_path(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!(
            "GATEWAY_PROXY_PATH must name a path below the root, got '{raw}'"
        ));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| matches!(c, '{' | '}' | '?' | '#') || c.is_whitespace())
    {
        return Err(anyhow::anyhow!(
            "GATEWAY_PROXY_PATH must be a literal path, '{raw}' contains '{bad}'"
        ));
    }
    let path = format!("/{trimmed}");
    if path == "/health" {
        return Err(anyhow::anyhow!("GATEWAY_PROXY_PATH '/health' is reserved"));
    }
    Ok(path)
}

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Failed to parse env var {key}={val}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_proxy_path() {
        assert_eq!(normalize_proxy_path("/gtm").unwrap(), "/gtm");
        assert_eq!(normalize_proxy_path("gtm/").unwrap(), "/gtm");
        assert_eq!(normalize_proxy_path(" /tags/gtm/ ").unwrap(), "/tags/gtm");
    }

    #[test]
    fn test_normalize_proxy_path_rejects_root_and_health() {
        assert!(normalize_proxy_path("").is_err());
        assert!(normalize_proxy_path("/").is_err());
        assert!(normalize_proxy_path("/health").is_err());
    }

    #[test]
    fn test_normalize_proxy_path_rejects_route_syntax() {
        for raw in ["/{id}", "/gtm/{*rest}", "/gt}m", "/gtm?x=1", "/gtm#top", "/g tm"] {
            assert!(normalize_proxy_path(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_env_parse_falls_back_and_reports_bad_values() {
        assert_eq!(env_parse("GATEWAY_TEST_UNSET_PORT", 4000u16).unwrap(), 4000);

        std::env::set_var("GATEWAY_TEST_BAD_PORT", "not-a-port");
        let err = env_parse("GATEWAY_TEST_BAD_PORT", 4000u16).unwrap_err();
        assert!(err.to_string().contains("GATEWAY_TEST_BAD_PORT"));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.proxy_path, DEFAULT_PROXY_PATH);
        assert_eq!(config.bind_addr(), "0.0.0.0:4000");
    }
}
