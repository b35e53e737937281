//! Authorization settings
//!
//! Settings are built once by the host process and handed to the engine
//! explicitly. Nothing in this crate reads ambient globals.
//!
//! Environment variables understood by [`AuthzSettings::from_env`]:
//! - `AUTHZ_SECRET_KEY` - token signing secret (required)
//! - `AUTHZ_MAINTENANCE` - maintenance mode, disables writes (default: false)
//! - `AUTHZ_PASSWORD_LOGIN` - password registration enabled (default: true)
//! - `AUTHZ_TOKEN_TTL` - session lifetime in seconds (default: 86400)
//! - `AUTHZ_GRANT_CACHE_TTL` - shared grant cache TTL in seconds (default: none)

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{AuthzError, Result};

/// Default session lifetime (one day)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings consumed by the authorization context
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthzSettings {
    /// System is in maintenance mode; no context may write
    pub maintenance: bool,

    /// Password-based registration is enabled
    pub password_login: bool,

    /// Token signing secret
    pub secret_key: String,

    /// Lifetime of a freshly constructed context
    #[serde(with = "duration_secs")]
    pub token_ttl: Duration,

    /// Optional bound on shared grant cache entries. Invalidation stays
    /// explicit; this only caps how long a missed invalidation survives.
    #[serde(with = "opt_duration_secs")]
    pub grant_cache_ttl: Option<Duration>,
}

impl Default for AuthzSettings {
    fn default() -> Self {
        Self {
            maintenance: false,
            password_login: true,
            secret_key: String::new(),
            token_ttl: DEFAULT_TOKEN_TTL,
            grant_cache_ttl: None,
        }
    }
}

impl AuthzSettings {
    /// Create settings with the given signing secret and defaults otherwise
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            ..Default::default()
        }
    }

    pub fn with_maintenance(mut self, maintenance: bool) -> Self {
        self.maintenance = maintenance;
        self
    }

    pub fn with_password_login(mut self, enabled: bool) -> Self {
        self.password_login = enabled;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_grant_cache_ttl(mut self, ttl: Duration) -> Self {
        self.grant_cache_ttl = Some(ttl);
        self
    }

    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        settings.secret_key = lookup("AUTHZ_SECRET_KEY")
            .ok_or_else(|| AuthzError::Config("AUTHZ_SECRET_KEY is not set".to_string()))?;

        if let Some(value) = lookup("AUTHZ_MAINTENANCE") {
            settings.maintenance = parse_flag("AUTHZ_MAINTENANCE", &value)?;
        }
        if let Some(value) = lookup("AUTHZ_PASSWORD_LOGIN") {
            settings.password_login = parse_flag("AUTHZ_PASSWORD_LOGIN", &value)?;
        }
        if let Some(value) = lookup("AUTHZ_TOKEN_TTL") {
            settings.token_ttl = parse_secs("AUTHZ_TOKEN_TTL", &value)?;
        }
        if let Some(value) = lookup("AUTHZ_GRANT_CACHE_TTL") {
            settings.grant_cache_ttl = Some(parse_secs("AUTHZ_GRANT_CACHE_TTL", &value)?);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check settings are usable for signing tokens
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(AuthzError::Config("secret key must not be empty".to_string()));
        }
        if self.token_ttl.is_zero() {
            return Err(AuthzError::Config("token TTL must be positive".to_string()));
        }
        if self.expiry_from(Utc::now()).is_none() {
            return Err(AuthzError::Config(format!(
                "token TTL of {}s is out of range",
                self.token_ttl.as_secs()
            )));
        }
        Ok(())
    }

    /// Expiry of a context built at `now`, `None` if it is not representable
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        ChronoDuration::from_std(self.token_ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AuthzError::Config(format!("{}: invalid flag {:?}", name, other))),
    }
}

fn parse_secs(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| AuthzError::Config(format!("{}: {}", name, e)))
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod opt_duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}
