use std::{env, fmt::Display, str::FromStr};

use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

const DEFAULT_DB_HOST: &str = "cluster0.hslh8b3.mongodb.net";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

pub struct Config {
    pub port: u16,
    pub mongodb_uri: String,
    pub db_name: String,
    pub token_secret: SecretString,
    pub payment_secret: SecretString,
    pub payment_api_base: String,
    pub currency: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_uri = match lookup("MONGODB_URI") {
            Some(uri) => uri,
            None => {
                let user = required(&lookup, "DB_USER")?;
                let pass = required(&lookup, "DB_PASS")?;
                let host = lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
                format!("mongodb+srv://{user}:{pass}@{host}/?retryWrites=true&w=majority")
            }
        };

        Ok(Self {
            port: try_load(&lookup, "PORT", "5000")?,
            mongodb_uri,
            db_name: try_load(&lookup, "DB_NAME", "bistroBossDb")?,
            token_secret: SecretString::from(required(&lookup, "ACCESS_TOKEN_SECRET")?),
            payment_secret: SecretString::from(required(&lookup, "PAYMENT_SECRET_KEY")?),
            payment_api_base: try_load(&lookup, "PAYMENT_API_BASE", "https://api.stripe.com")?,
            currency: try_load(&lookup, "PAYMENT_CURRENCY", "usd")?,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.is_empty()).ok_or(ConfigError::Missing(key))
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid { key, message: e.to_string() })
}
