// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::{LynqarConfig, MIN_KDF_ITERATIONS, MIN_PASSPHRASE_LENGTH};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &LynqarConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.vault.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::validation(format!(
            "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
            config.vault.kdf_iterations
        )));
    }

    if config.vault.min_passphrase_length < MIN_PASSPHRASE_LENGTH {
        errors.push(ConfigError::validation(format!(
            "vault.min_passphrase_length must be at least {MIN_PASSPHRASE_LENGTH}, got {}",
            config.vault.min_passphrase_length
        )));
    }

    let session = &config.session;
    if session.auto_lock_secs == 0 {
        errors.push(ConfigError::validation(
            "session.auto_lock_secs must be greater than 0",
        ));
    }
    if session.check_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "session.check_interval_secs must be greater than 0",
        ));
    } else if session.auto_lock_secs > 0 && session.check_interval_secs > session.auto_lock_secs {
        errors.push(ConfigError::validation(format!(
            "session.check_interval_secs ({}) must not exceed session.auto_lock_secs ({})",
            session.check_interval_secs, session.auto_lock_secs
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level `{}` is not one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
