/*
 * Responsibility
 * - load settings from the environment (.env via dotenvy)
 * - validate them (fail startup when something required is missing)
 * - decide whether the reserved test token is honored
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::identity::BypassPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub const DEFAULT_ISSUER: &str = "https://localhost:4433/";

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // HS256 shared secret used to verify (and, for dev tooling, sign) access tokens
    pub jwt_secret: String,
    pub auth_issuer: String,
    pub token_ttl_seconds: u64,
    pub token_leeway_seconds: u64,

    pub test_bypass: BypassPolicy,

    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let jwt_secret =
            std::env::var("AUTH_JWT_SECRET").map_err(|_| ConfigError::Missing("AUTH_JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("AUTH_JWT_SECRET"));
        }

        let auth_issuer =
            std::env::var("AUTH_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());

        let token_ttl_seconds = std::env::var("AUTH_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(86_400); // 24h

        let token_leeway_seconds = std::env::var("AUTH_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let raw_bypass = std::env::var("AUTH_TEST_BYPASS").ok();
        let test_bypass = bypass_policy(app_env, raw_bypass.as_deref())?;

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let body_limit_bytes = std::env::var("REQUEST_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        Ok(Self {
            addr,
            app_env,
            jwt_secret,
            auth_issuer,
            token_ttl_seconds,
            token_leeway_seconds,
            test_bypass,
            request_timeout,
            body_limit_bytes,
        })
    }
}

/// Interpret `AUTH_TEST_BYPASS`.
///
/// Unset means disabled. Enabling it in production is a startup error rather
/// than a silent downgrade, so a leaked `.env` cannot open the bypass.
pub fn bypass_policy(app_env: AppEnv, raw: Option<&str>) -> Result<BypassPolicy, ConfigError> {
    let enabled = match raw.map(|s| s.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => match v.as_str() {
            "" | "0" | "false" | "no" | "off" => false,
            "1" | "true" | "yes" | "on" => true,
            _ => return Err(ConfigError::Invalid("AUTH_TEST_BYPASS")),
        },
    };

    match (enabled, app_env.is_production()) {
        (true, true) => Err(ConfigError::Invalid("AUTH_TEST_BYPASS")),
        (true, false) => Ok(BypassPolicy::Enabled),
        (false, _) => Ok(BypassPolicy::Disabled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_parses_aliases() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn bypass_is_disabled_unless_asked_for() {
        assert_eq!(
            bypass_policy(AppEnv::Development, None),
            Ok(BypassPolicy::Disabled)
        );
        assert_eq!(
            bypass_policy(AppEnv::Development, Some("off")),
            Ok(BypassPolicy::Disabled)
        );
        assert_eq!(
            bypass_policy(AppEnv::Development, Some(" TRUE ")),
            Ok(BypassPolicy::Enabled)
        );
    }

    #[test]
    fn bypass_is_refused_in_production() {
        assert_eq!(
            bypass_policy(AppEnv::Production, Some("1")),
            Err(ConfigError::Invalid("AUTH_TEST_BYPASS"))
        );
        assert_eq!(
            bypass_policy(AppEnv::Production, Some("false")),
            Ok(BypassPolicy::Disabled)
        );
    }

    #[test]
    fn bypass_rejects_garbage() {
        assert_eq!(
            bypass_policy(AppEnv::Development, Some("maybe")),
            Err(ConfigError::Invalid("AUTH_TEST_BYPASS"))
        );
    }
}
