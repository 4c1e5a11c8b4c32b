//! Configuration for the booking service.
//!
//! Loaded from environment variables (and a `.env` file when present) with
//! defaults suitable for local development.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DATABASE_URL: &str = "sqlite://vet_booking.db";
const DEFAULT_SLOT: &str = "appointments";
const DEFAULT_SUBMIT_DELAY_MS: u64 = 1500;

/// Where appointments are kept between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite database URL handed to sqlx.
    Sqlite(String),
    /// Process memory only; everything is lost on exit.
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub storage: StorageBackend,
    /// Slot name the appointment collection is stored under.
    pub appointments_slot: String,
    /// Artificial delay applied to every wizard submission.
    pub submit_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let storage = match env::var("APP_DATABASE_URL") {
            Ok(url) if url.eq_ignore_ascii_case("memory") => StorageBackend::Memory,
            Ok(url) => StorageBackend::Sqlite(url),
            Err(_) => StorageBackend::Sqlite(DEFAULT_DATABASE_URL.to_string()),
        };

        let submit_delay_ms = match env::var("SUBMIT_DELAY_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid SUBMIT_DELAY_MS: {raw}"))?,
            Err(_) => DEFAULT_SUBMIT_DELAY_MS,
        };

        let config = AppConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            storage,
            appointments_slot: env::var("APPOINTMENTS_SLOT")
                .unwrap_or_else(|_| DEFAULT_SLOT.to_string()),
            submit_delay: Duration::from_millis(submit_delay_ms),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.appointments_slot.trim().is_empty() {
            anyhow::bail!("APPOINTMENTS_SLOT must not be empty");
        }
        if self.bind_addr.trim().is_empty() {
            anyhow::bail!("BIND_ADDR must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            bind_addr: "127.0.0.1:3000".to_string(),
            storage: StorageBackend::Memory,
            appointments_slot: "appointments".to_string(),
            submit_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_from_env_defaults_and_overrides() {
        // Single test touching the environment so parallel tests cannot race.
        for key in ["BIND_ADDR", "APP_DATABASE_URL", "APPOINTMENTS_SLOT", "SUBMIT_DELAY_MS"] {
            env::remove_var(key);
        }

        let defaults = AppConfig::from_env().unwrap();
        assert_eq!(defaults.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(
            defaults.storage,
            StorageBackend::Sqlite(DEFAULT_DATABASE_URL.to_string())
        );
        assert_eq!(defaults.appointments_slot, "appointments");
        assert_eq!(defaults.submit_delay, Duration::from_millis(1500));

        env::set_var("APP_DATABASE_URL", "memory");
        env::set_var("SUBMIT_DELAY_MS", "25");
        let overridden = AppConfig::from_env().unwrap();
        assert_eq!(overridden.storage, StorageBackend::Memory);
        assert_eq!(overridden.submit_delay, Duration::from_millis(25));

        env::set_var("SUBMIT_DELAY_MS", "soon");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("Invalid SUBMIT_DELAY_MS"));

        env::remove_var("APP_DATABASE_URL");
        env::remove_var("SUBMIT_DELAY_MS");
    }

    #[test]
    fn test_validate_rejects_empty_slot() {
        let mut config = config();
        assert!(config.validate().is_ok());

        config.appointments_slot = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("APPOINTMENTS_SLOT"));
    }
}
