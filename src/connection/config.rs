use super::origin;
use super::redirect::RedirectPolicy;
use crate::core::{ClientError, Result};
use std::time::Duration;

/// Comma-separated list of backend origins
pub const ENV_API_URLS: &str = "HOMEBAR_API_URLS";
/// Fixed path prefix appended to every origin
pub const ENV_API_PREFIX: &str = "HOMEBAR_API_PREFIX";
/// Per-attempt timeout in milliseconds
pub const ENV_API_TIMEOUT_MS: &str = "HOMEBAR_API_TIMEOUT_MS";
/// `any` or `configured`
pub const ENV_REDIRECT_POLICY: &str = "HOMEBAR_REDIRECT_POLICY";

pub const DEFAULT_API_PREFIX: &str = "/api";

/// Raft nodes of a local three-node cluster.
pub const DEFAULT_ORIGINS: [&str; 3] = [
    "http://localhost:9001",
    "http://localhost:9002",
    "http://localhost:9003",
];

/// How many recovery hops a single logical request may spend
///
/// Each physical retry consumes one unit of the matching kind. With the
/// default budget a request can rotate once after a transport failure and
/// follow one leader redirect, so at most three physical attempts are made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryBudget {
    pub rotations: u32,
    pub redirects: u32,
}

impl RecoveryBudget {
    pub fn new(rotations: u32, redirects: u32) -> Self {
        Self {
            rotations,
            redirects,
        }
    }

    /// No recovery at all: every failure and redirect is surfaced.
    pub fn none() -> Self {
        Self::new(0, 0)
    }
}

impl Default for RecoveryBudget {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Client configuration
///
/// The origin list is the durable endpoint pool; everything else is
/// passed through to the HTTP stack or the recovery logic.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Ordered candidate origins, first one presumed active
    pub origins: Vec<String>,

    /// Path prefix joined to the active origin
    pub api_prefix: String,

    /// Whole-attempt timeout
    pub timeout: Option<Duration>,

    /// Connect timeout
    pub connect_timeout: Option<Duration>,

    pub recovery: RecoveryBudget,

    pub redirect_policy: RedirectPolicy,

    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration for the given origins
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: None,
            connect_timeout: None,
            recovery: RecoveryBudget::default(),
            redirect_policy: RedirectPolicy::default(),
            user_agent: format!("homebar-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the path prefix
    pub fn api_prefix(mut self, prefix: &str) -> Self {
        self.api_prefix = prefix.to_string();
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the recovery budget
    pub fn recovery(mut self, budget: RecoveryBudget) -> Self {
        self.recovery = budget;
        self
    }

    /// Set the redirect policy
    pub fn redirect_policy(mut self, policy: RedirectPolicy) -> Self {
        self.redirect_policy = policy;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Load from the process environment
    ///
    /// Unset variables fall back to defaults; set but invalid ones are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(ENV_API_URLS) {
            Some(raw) => Self::new(parse_origin_list(&raw)?),
            None => Self::default(),
        };

        if let Some(prefix) = lookup(ENV_API_PREFIX) {
            config.api_prefix = prefix.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_API_TIMEOUT_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Configuration(format!("{} must be an integer, got '{}'", ENV_API_TIMEOUT_MS, raw))
            })?;
            config.timeout = Some(Duration::from_millis(millis));
        }

        if let Some(raw) = lookup(ENV_REDIRECT_POLICY) {
            config.redirect_policy = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.origins.is_empty() {
            return Err(ClientError::Configuration(
                "endpoint pool needs at least one origin".into(),
            ));
        }

        for raw in &self.origins {
            origin::normalize(raw)?;
        }

        if !self.api_prefix.is_empty() {
            if !self.api_prefix.starts_with('/') {
                return Err(ClientError::Configuration(format!(
                    "api prefix '{}' must start with '/'",
                    self.api_prefix
                )));
            }
            if self.api_prefix.ends_with('/') {
                return Err(ClientError::Configuration(format!(
                    "api prefix '{}' must not end with '/'",
                    self.api_prefix
                )));
            }
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(ClientError::Configuration("timeout must be > 0".into()));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGINS)
    }
}

/// Split a comma-separated origin list
///
/// Blank entries are skipped. Every remaining entry must be a valid origin
/// and at least one must remain.
pub fn parse_origin_list(raw: &str) -> Result<Vec<String>> {
    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(origin::normalize)
        .collect::<Result<Vec<_>>>()?;

    if origins.is_empty() {
        return Err(ClientError::Configuration(format!(
            "no origins found in '{}'",
            raw
        )));
    }

    Ok(origins)
}
