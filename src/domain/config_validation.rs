//! Configuration validation.
//!
//! Every key is optional; these checks only reject values that are present
//! and unusable.

use crate::domain::error::JournalError;
use crate::ports::config_port::ConfigPort;

pub const STORAGE_BACKENDS: [&str; 3] = ["file", "sqlite", "memory"];

pub fn validate_journal_config(config: &dyn ConfigPort) -> Result<(), JournalError> {
    validate_backend(config)?;
    validate_storage_key(config)?;
    validate_pool_size(config)?;
    validate_currency(config)?;
    validate_recent(config)?;
    Ok(())
}

fn validate_backend(config: &dyn ConfigPort) -> Result<(), JournalError> {
    let Some(backend) = config.get_string("storage", "backend") else {
        return Ok(());
    };
    let backend = backend.trim().to_lowercase();
    if !STORAGE_BACKENDS.contains(&backend.as_str()) {
        return Err(JournalError::ConfigInvalid {
            section: "storage".to_string(),
            key: "backend".to_string(),
            reason: format!(
                "unknown backend '{}' (expected one of: {})",
                backend,
                STORAGE_BACKENDS.join(", ")
            ),
        });
    }
    #[cfg(not(feature = "sqlite"))]
    {
        if backend == "sqlite" {
            return Err(JournalError::ConfigInvalid {
                section: "storage".to_string(),
                key: "backend".to_string(),
                reason: "sqlite backend requires the sqlite feature".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_storage_key(config: &dyn ConfigPort) -> Result<(), JournalError> {
    if let Some(key) = config.get_string("storage", "key") {
        if key.trim().is_empty() {
            return Err(JournalError::ConfigInvalid {
                section: "storage".to_string(),
                key: "key".to_string(),
                reason: "key must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), JournalError> {
    let value = config.get_int("storage", "pool_size", 4);
    if value < 1 || value > 64 {
        return Err(JournalError::ConfigInvalid {
            section: "storage".to_string(),
            key: "pool_size".to_string(),
            reason: "pool_size must be between 1 and 64".to_string(),
        });
    }
    Ok(())
}

fn validate_currency(config: &dyn ConfigPort) -> Result<(), JournalError> {
    if let Some(currency) = config.get_string("display", "currency") {
        let currency = currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(JournalError::ConfigInvalid {
                section: "display".to_string(),
                key: "currency".to_string(),
                reason: "currency must be a three-letter code".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_recent(config: &dyn ConfigPort) -> Result<(), JournalError> {
    let value = config.get_int("display", "recent", 5);
    if value < 1 {
        return Err(JournalError::ConfigInvalid {
            section: "display".to_string(),
            key: "recent".to_string(),
            reason: "recent must be at least 1".to_string(),
        });
    }
    Ok(())
}
