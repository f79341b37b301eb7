// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Lookup order: `./lynqar.toml` > `~/.config/lynqar/lynqar.toml` > `/etc/lynqar/lynqar.toml`,
//! with `LYNQAR_` environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LynqarConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/lynqar/lynqar.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "lynqar.toml";

/// Per-user config file under the XDG config directory, if one can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lynqar").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lynqar/lynqar.toml`
/// 3. `~/.config/lynqar/lynqar.toml`
/// 4. `./lynqar.toml`
/// 5. `LYNQAR_*` environment variables
pub fn load_config() -> Result<LynqarConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<LynqarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LynqarConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file, still honoring env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LynqarConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LynqarConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LynqarConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Sections that `LYNQAR_<SECTION>_<KEY>` variables map into.
const ENV_SECTIONS: [&str; 4] = ["vault", "session", "storage", "logging"];

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `LYNQAR_SESSION_AUTO_LOCK_SECS` into
/// `session.auto.lock.secs`; only the first segment names the section.
/// Keys arrive prefix-stripped in their original case.
fn env_provider() -> Env {
    Env::prefixed("LYNQAR_")
        .ignore(&["PASSPHRASE"])
        .map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ENV_SECTIONS {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LYNQAR_SESSION_AUTO_LOCK_SECS", "120");
            jail.set_env("LYNQAR_VAULT_KDF_ITERATIONS", "250000");
            jail.set_env("LYNQAR_LOGGING_LEVEL", "debug");

            let config = build_figment().extract::<LynqarConfig>()?;
            assert_eq!(config.session.auto_lock_secs, 120);
            assert_eq!(config.vault.kdf_iterations, 250_000);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn env_key_mapping_lowercases_and_splits_once() {
        assert_eq!(map_env_key("SESSION_AUTO_LOCK_SECS"), "session.auto_lock_secs");
        assert_eq!(map_env_key("STORAGE_DATABASE_PATH"), "storage.database_path");
        assert_eq!(map_env_key("vault_kdf_iterations"), "vault.kdf_iterations");
        assert_eq!(map_env_key("SESSIONS"), "sessions");
        assert_eq!(map_env_key("UNKNOWN_KEY"), "unknown_key");
    }

    #[test]
    fn env_overrides_reach_validated_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LYNQAR_SESSION_AUTO_LOCK_SECS", "60");
            jail.set_env("LYNQAR_STORAGE_WAL_MODE", "false");

            let config = crate::load_and_validate().map_err(|errors| {
                figment::Error::from(format!("{} config error(s)", errors.len()))
            })?;
            assert_eq!(config.session.auto_lock_secs, 60);
            assert!(!config.storage.wal_mode);
            Ok(())
        });
    }

    #[test]
    fn passphrase_env_is_not_treated_as_config() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LYNQAR_PASSPHRASE", "correcthorse1");
            let config = build_figment().extract::<LynqarConfig>()?;
            assert_eq!(config.vault.min_passphrase_length, 8);
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
                [storage]
                database_path = "vault.db"
                wal_mode = false
                "#,
            )?;
            let config = load_config()?;
            assert_eq!(config.storage.database_path, "vault.db");
            assert!(!config.storage.wal_mode);
            assert_eq!(config.session.check_interval_secs, 30);
            Ok(())
        });
    }
}
