use std::{fmt, str::FromStr};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("payment environment should either be set to `sandbox` or `production`, got `{0}`")]
    InvalidEnvironment(String),
    #[error("{name} must be between 1 and {max} minutes, got `{value}`", max = MAX_TTL_MINUTES)]
    InvalidTtl { name: &'static str, value: String },
}

/// Signing secrets are optional here: a missing one only fails the requests
/// that need it.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: Option<String>,
    pub refresh_secret: Option<String>,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentEnvironment {
    Sandbox,
    Production,
}

impl FromStr for PaymentEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for PaymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => f.write_str("sandbox"),
            Self::Production => f.write_str("production"),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub environment: PaymentEnvironment,
    pub api_base: String,
}

// Keeps the secret key out of logs.
impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("environment", &self.environment)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl PaymentConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://api.stripe.com/v1";

    /// True when the key prefix agrees with the configured environment.
    pub fn key_matches_environment(&self) -> bool {
        match self.environment {
            PaymentEnvironment::Sandbox => !self.secret_key.starts_with("sk_live_"),
            PaymentEnvironment::Production => !self.secret_key.starts_with("sk_test_"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub payments: PaymentConfig,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = required("DATABASE_URL")?;

        let environment = lookup("PAYMENT_ENVIRONMENT").unwrap_or_default().parse()?;
        let payments = PaymentConfig {
            secret_key: required("PAYMENT_SECRET_KEY")?,
            environment,
            api_base: non_empty("PAYMENT_API_BASE")
                .unwrap_or_else(|| PaymentConfig::DEFAULT_API_BASE.into()),
        };

        let jwt = JwtConfig {
            access_secret: non_empty("JWT_ACCESS_SECRET"),
            refresh_secret: non_empty("JWT_REFRESH_SECRET"),
            access_ttl_minutes: ttl_minutes(&lookup, "JWT_ACCESS_TTL_MINUTES", 60 * 24)?,
            refresh_ttl_minutes: ttl_minutes(&lookup, "JWT_REFRESH_TTL_MINUTES", 60 * 24 * 10)?,
        };

        let cookie_secure = lookup("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            database_url,
            jwt,
            payments,
            cookie_secure,
        })
    }
}

/// Ten years.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

fn ttl_minutes<F>(lookup: &F, name: &'static str, default: i64) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.parse::<i64>() {
            Ok(minutes) if (1..=MAX_TTL_MINUTES).contains(&minutes) => Ok(minutes),
            _ => Err(ConfigError::InvalidTtl { name, value }),
        },
    }
}
