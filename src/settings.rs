//! Runtime configuration.
//!
//! Settings come from an optional TOML file, after which the `DATABASE_URL`,
//! `SECRET_KEY` and `BIND_ADDRESS` environment variables take precedence.

use std::{path::Path, time::Duration};

use axum_extra::extract::cookie::Key;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("SECRET_KEY must be at least 64 bytes long")]
    ShortKey,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    pub database_url: String,
    /// Key used to encrypt the session and cooldown cookies. A random key is
    /// generated when this is absent, which logs everyone out on restart.
    pub secret_key: Option<String>,
    /// How long the intro animation covers the landing page.
    pub intro_ms: u64,
    /// Length of the registration window started on a browser's first visit.
    pub registration_window_days: u32,
    /// Minimum time between two successful enrollments from one browser
    /// session.
    pub cooldown_hours: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            database_url: "solarys.db".to_string(),
            secret_key: None,
            intro_ms: 4000,
            registration_window_days: 5,
            cooldown_hours: 2,
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| {
                    SettingsError::Read {
                        path: path.display().to_string(),
                        source,
                    }
                })?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };

        Ok(settings.with_env())
    }

    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            self.secret_key = Some(secret);
        }
        if let Ok(address) = std::env::var("BIND_ADDRESS") {
            self.bind_address = address;
        }
        self
    }

    pub fn cookie_key(&self) -> Result<Key, SettingsError> {
        match &self.secret_key {
            Some(secret) => Key::try_from(secret.as_bytes())
                .map_err(|_| SettingsError::ShortKey),
            None => {
                tracing::warn!(
                    "no secret key configured, generating a temporary one"
                );
                Ok(Key::generate())
            }
        }
    }

    pub fn intro(&self) -> Duration {
        Duration::from_millis(self.intro_ms)
    }

    pub fn registration_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.registration_window_days))
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.cooldown_hours))
    }
}
