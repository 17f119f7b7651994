//! Client configuration: environments, endpoints and `.env` loading.

use std::fmt::Debug;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use tracing::{debug, error};

use crate::error::{PingupError, Result};

/// Base URL of the live Pingup API.
pub const LIVE_ENDPOINT: &str = "https://api.pingup.com/";
/// Base URL of the sandbox Pingup API.
pub const SANDBOX_ENDPOINT: &str = "http://api.sandbox.pingup.com/";
/// Version segment prefixed to every authenticated path.
pub const API_VERSION: &str = "v1";

/// Which deployment of the service a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Live,
    Sandbox,
}

impl Environment {
    pub fn from_sandbox(sandbox: bool) -> Self {
        if sandbox {
            Environment::Sandbox
        } else {
            Environment::Live
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Live => LIVE_ENDPOINT,
            Environment::Sandbox => SANDBOX_ENDPOINT,
        }
    }
}

/// Settings for a [`PingupClient`](crate::PingupClient).
///
/// * `token` – access token issued by [`auth::generate_tokens`](crate::auth::generate_tokens)
/// * `environment` – live or sandbox deployment
/// * `endpoint` – optional base URL overriding the environment's one
/// * `timeout` – optional per-request timeout; `None` waits indefinitely
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token: String,
    pub environment: Environment,
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>, environment: Environment) -> Self {
        Self {
            token: token.into(),
            environment,
            endpoint: None,
            timeout: None,
        }
    }

    /// Point the client at a different base URL, e.g. a proxy or a mock server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolved base URL, always ending in `/`.
    pub fn base_url(&self) -> String {
        match self.endpoint {
            Some(ref endpoint) => normalize_endpoint(endpoint),
            None => self.environment.base_url().to_string(),
        }
    }

    /// Build a configuration from the process environment (and `.env`, if any).
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `PINGUP_TOKEN` | access token (required) |
    /// | `PINGUP_SANDBOX` | `true` to use the sandbox deployment |
    /// | `PINGUP_ENDPOINT` | base URL override |
    /// | `PINGUP_TIMEOUT_SECS` | request timeout in seconds |
    pub fn from_env() -> Result<Self> {
        match dotenv() {
            Ok(_) => debug!("Loaded .env file"),
            Err(e) => debug!("No .env file loaded: {e}"),
        }
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("PINGUP_TOKEN")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                error!("PINGUP_TOKEN not found in environment variables or .env file");
                PingupError::Config("PINGUP_TOKEN is not set".into())
            })?;

        let sandbox = parse_or_default(&lookup, "PINGUP_SANDBOX", false);
        let mut config = Self::new(token, Environment::from_sandbox(sandbox));

        if let Some(endpoint) = lookup("PINGUP_ENDPOINT").filter(|e| !e.is_empty()) {
            config = config.with_endpoint(endpoint);
        }
        if let Some(secs) = parse_or_none::<u64, _>(&lookup, "PINGUP_TIMEOUT_SECS") {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    format!("{}/", endpoint.trim_end_matches('/'))
}

fn parse_or_default<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr,
    <T as FromStr>::Err: Debug,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", name, val);
            default
        }),
        None => default,
    }
}

fn parse_or_none<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    <T as FromStr>::Err: Debug,
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(name)?;
    match val.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            error!("Failed to parse {}: {}, ignoring", name, val);
            None
        }
    }
}
