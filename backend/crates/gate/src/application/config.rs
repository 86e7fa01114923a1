//! Application Configuration
//!
//! Process-wide gate configuration. Built once at startup, shared read-only
//! through `Arc`, and handed to each component at construction.

use platform::rate_limit::RateLimitConfig;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const ENV_JWT_SECRET_KEY: &str = "JWT_SECRET_KEY";
pub const ENV_SIGNATURE_KEY: &str = "SIGNATURE_KEY";
pub const ENV_RATE_LIMIT_MAX_REQUESTS: &str = "RATE_LIMIT_MAX_REQUESTS";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "RATE_LIMIT_WINDOW_SECS";
pub const ENV_TOKEN_LEEWAY_SECS: &str = "TOKEN_LEEWAY_SECS";
pub const ENV_TOKEN_TTL_SECS: &str = "TOKEN_TTL_SECS";
pub const ENV_TRUST_FORWARDED_FOR: &str = "TRUST_FORWARDED_FOR";

/// Upper bound for the `exp` clock-skew allowance
pub const MAX_TOKEN_LEEWAY: Duration = Duration::from_secs(86_400);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{name} is not a valid {expected}: {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Gate configuration
#[derive(Clone)]
pub struct GateConfig {
    /// Secret for HMAC token signatures
    pub token_secret: String,
    /// Shared secret mixed into request signatures
    pub signature_key: String,
    /// Admission policy
    pub rate_limit: RateLimitConfig,
    /// Clock-skew allowance when checking `exp`
    pub token_leeway: Duration,
    /// Lifetime of tokens issued by this service
    pub token_ttl: Duration,
    /// Key admission on `X-Forwarded-For` instead of the peer address
    pub trust_forwarded_for: bool,
}

impl GateConfig {
    /// Config with the given secrets and default policy
    pub fn new(token_secret: impl Into<String>, signature_key: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            signature_key: signature_key.into(),
            rate_limit: RateLimitConfig::default(),
            token_leeway: Duration::from_secs(30),
            token_ttl: Duration::from_secs(3600),
            trust_forwarded_for: false,
        }
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let mut config = Self::new(require(ENV_JWT_SECRET_KEY)?, require(ENV_SIGNATURE_KEY)?);

        if let Some(max) = parse_var(&lookup, ENV_RATE_LIMIT_MAX_REQUESTS, "u32")? {
            config.rate_limit.max_requests = max;
        }
        if let Some(secs) = parse_var(&lookup, ENV_RATE_LIMIT_WINDOW_SECS, "u64")? {
            config.rate_limit.window = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, ENV_TOKEN_LEEWAY_SECS, "u64")? {
            config.token_leeway = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, ENV_TOKEN_TTL_SECS, "u64")? {
            config.token_ttl = Duration::from_secs(secs);
        }
        if let Some(trust) = parse_var(&lookup, ENV_TRUST_FORWARDED_FOR, "bool")? {
            config.trust_forwarded_for = trust;
        }

        config.validate()?;
        Ok(config)
    }

    /// Range checks that parsing alone cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_secret.is_empty() {
            return Err(ConfigError::Empty(ENV_JWT_SECRET_KEY));
        }
        if self.signature_key.is_empty() {
            return Err(ConfigError::Empty(ENV_SIGNATURE_KEY));
        }
        let window = self.rate_limit.window;
        if window.is_zero() || i64::try_from(window.as_millis()).is_err() {
            return Err(ConfigError::Invalid {
                name: ENV_RATE_LIMIT_WINDOW_SECS,
                expected: "non-zero window whose milliseconds fit in i64",
                value: window.as_secs().to_string(),
            });
        }
        if i64::try_from(self.token_ttl.as_secs()).is_err() {
            return Err(ConfigError::Invalid {
                name: ENV_TOKEN_TTL_SECS,
                expected: "lifetime whose seconds fit in i64",
                value: self.token_ttl.as_secs().to_string(),
            });
        }
        if self.token_leeway > MAX_TOKEN_LEEWAY {
            return Err(ConfigError::Invalid {
                name: ENV_TOKEN_LEEWAY_SECS,
                expected: "leeway of at most one day",
                value: self.token_leeway.as_secs().to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<F, T>(
    lookup: &F,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
    }
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("token_secret", &"<redacted>")
            .field("signature_key", &"<redacted>")
            .field("rate_limit", &self.rate_limit)
            .field("token_leeway", &self.token_leeway)
            .field("token_ttl", &self.token_ttl)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .finish()
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
    fn test_defaults_apply() {
        let config = GateConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET_KEY, "jwt"),
            (ENV_SIGNATURE_KEY, "sig"),
        ]))
        .unwrap();
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.token_leeway, Duration::from_secs(30));
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = GateConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET_KEY, "jwt"),
            (ENV_SIGNATURE_KEY, "sig"),
            (ENV_RATE_LIMIT_MAX_REQUESTS, "5"),
            (ENV_RATE_LIMIT_WINDOW_SECS, " 10 "),
            (ENV_TOKEN_TTL_SECS, "120"),
            (ENV_TRUST_FORWARDED_FOR, "true"),
        ]))
        .unwrap();
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window, Duration::from_secs(10));
        assert_eq!(config.token_ttl, Duration::from_secs(120));
        assert!(config.trust_forwarded_for);
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let err = GateConfig::from_lookup(lookup(&[(ENV_SIGNATURE_KEY, "sig")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_JWT_SECRET_KEY));
    }

    #[test]
    fn test_empty_secret_is_an_error() {
        let err = GateConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET_KEY, "jwt"),
            (ENV_SIGNATURE_KEY, ""),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Empty(ENV_SIGNATURE_KEY));
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = GateConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET_KEY, "jwt"),
            (ENV_SIGNATURE_KEY, "sig"),
            (ENV_RATE_LIMIT_MAX_REQUESTS, "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_RATE_LIMIT_MAX_REQUESTS));
    }

    fn with_secrets<'a>(extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut vars = vec![(ENV_JWT_SECRET_KEY, "jwt"), (ENV_SIGNATURE_KEY, "sig")];
        vars.extend_from_slice(extra);
        vars
    }

    #[test]
    fn test_out_of_range_window_is_an_error() {
        let vars = with_secrets(&[
            (ENV_RATE_LIMIT_MAX_REQUESTS, "1"),
            (ENV_RATE_LIMIT_WINDOW_SECS, "10000000000000000"),
        ]);
        let err = GateConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_RATE_LIMIT_WINDOW_SECS));

        let vars = with_secrets(&[(ENV_RATE_LIMIT_WINDOW_SECS, "0")]);
        let err = GateConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_RATE_LIMIT_WINDOW_SECS));
    }

    #[test]
    fn test_largest_valid_window_is_accepted() {
        let max_secs = (i64::MAX / 1_000).to_string();
        let vars = with_secrets(&[(ENV_RATE_LIMIT_WINDOW_SECS, max_secs.as_str())]);
        let config = GateConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.rate_limit.window_ms() > 1);
    }

    #[test]
    fn test_out_of_range_token_lifetimes_are_errors() {
        let vars = with_secrets(&[(ENV_TOKEN_TTL_SECS, "18446744073709551615")]);
        let err = GateConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_TOKEN_TTL_SECS));

        let vars = with_secrets(&[(ENV_TOKEN_LEEWAY_SECS, "86401")]);
        let err = GateConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name, .. } if name == ENV_TOKEN_LEEWAY_SECS));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = GateConfig::new("top-secret-jwt", "top-secret-sig");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
