//! Process configuration.
//!
//! Everything is read from environment variables once at startup. Loading
//! goes through a lookup function so tests never touch the real
//! environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use lectern_upstream::{DEFAULT_BRAND, UpstreamConfig};

use crate::error::{Error, Result};
use crate::service::RefreshPolicy;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 10000;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development; request origin checks are relaxed.
    #[default]
    Development,
    /// Public deployment.
    Production,
}

impl Environment {
    /// Returns true in production.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "" => Ok(Self::Development),
            other => Err(Error::config(format!("unknown environment: {other}"))),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub listen_addr: SocketAddr,
    /// Directory of front-end assets, if any.
    pub static_dir: Option<PathBuf>,
    /// Origins allowed to make cross-origin requests.
    pub allowed_origins: Vec<String>,
    /// Deployment environment.
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            static_dir: None,
            allowed_origins: Vec::new(),
            environment: Environment::Development,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Upstream endpoints and request shaping.
    pub upstream: UpstreamConfig,
    /// Refresh timing.
    pub refresh: RefreshPolicy,
    /// Brand substituted into upstream content.
    pub brand: String,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`.
    ///
    /// Unset and empty variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port: u16 = parse_or(&var, "PORT", DEFAULT_PORT)?;
        let bind: IpAddr = parse_or(&var, "BIND_ADDR", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let environment: Environment = parse_or(&var, "APP_ENV", Environment::Development)?;

        let server = ServerConfig {
            listen_addr: SocketAddr::new(bind, port),
            static_dir: var("STATIC_DIR").map(PathBuf::from),
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            environment,
        };

        let timeout_secs: u64 = parse_or(&var, "REQUEST_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(Error::config("REQUEST_TIMEOUT_SECS must be greater than zero"));
        }
        let mut upstream = UpstreamConfig::builder().timeout(Duration::from_secs(timeout_secs));
        if let Some(url) = var("TOKEN_URL") {
            upstream = upstream.token_url(url);
        }
        if let Some(url) = var("CONTENT_URL") {
            upstream = upstream.content_url(url);
        }
        if let Some(referer) = var("UPSTREAM_REFERER") {
            upstream = upstream.referer(referer);
        }
        if let Some(user_agent) = var("UPSTREAM_USER_AGENT") {
            upstream = upstream.user_agent(user_agent);
        }
        let upstream = upstream.build()?;

        let interval_secs: u64 = parse_or(&var, "REFRESH_INTERVAL_SECS", 60)?;
        if interval_secs == 0 {
            return Err(Error::config("REFRESH_INTERVAL_SECS must be greater than zero"));
        }
        let jitter_secs: u64 = parse_or(&var, "REFRESH_JITTER_SECS", 0)?;
        let refresh = RefreshPolicy::every(Duration::from_secs(interval_secs))
            .with_jitter(Duration::from_secs(jitter_secs));

        let brand = var("BRAND_NAME").unwrap_or_else(|| DEFAULT_BRAND.to_string());

        Ok(Self {
            server,
            upstream,
            refresh,
            brand,
        })
    }
}

fn parse_or<T, F>(var: F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| Error::config(format!("invalid {key}={raw:?}: {e}")))
    })
}
