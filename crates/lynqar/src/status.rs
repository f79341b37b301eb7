// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lynqar status` command implementation.
//!
//! Reports where the vault lives and how it is configured. Never asks for
//! the passphrase and never reads the encrypted collection.

use std::io::IsTerminal;

use colored::Colorize;
use lynqar_config::LynqarConfig;
use lynqar_core::LynqarError;
use serde::Serialize;

use crate::commands::open_session;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub database_path: String,
    pub backend: String,
    pub initialized: bool,
    pub auto_lock_secs: u64,
    pub check_interval_secs: u64,
    pub kdf_iterations: u32,
}

/// Format seconds as `15m` or `1h 30m` or `45s`.
fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 && seconds == 0 {
        format!("{minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

pub async fn collect_status(config: &LynqarConfig) -> Result<StatusResponse, LynqarError> {
    let guard = open_session(config).await?;
    Ok(StatusResponse {
        database_path: config.storage.database_path.clone(),
        backend: guard.backend().to_string(),
        initialized: guard.is_initialized(),
        auto_lock_secs: config.session.auto_lock_secs,
        check_interval_secs: config.session.check_interval_secs,
        kdf_iterations: config.vault.kdf_iterations,
    })
}

/// Run the `lynqar status` command.
///
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(config: &LynqarConfig, json: bool, plain: bool) -> Result<(), LynqarError> {
    let status = collect_status(config).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| LynqarError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let use_color = !plain && std::io::stdout().is_terminal();
    print_status(&status, use_color);
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    let state = if status.initialized {
        "initialized"
    } else {
        "not initialized (run `lynqar init`)"
    };

    if use_color {
        let state = if status.initialized {
            state.green()
        } else {
            state.yellow()
        };
        println!("{}", "lynqar".bold());
        println!("  vault:      {state}");
    } else {
        println!("lynqar");
        println!("  vault:      {state}");
    }
    println!("  database:   {} ({})", status.database_path, status.backend);
    println!(
        "  auto-lock:  after {} idle, checked every {}",
        format_duration(status.auto_lock_secs),
        format_duration(status.check_interval_secs)
    );
    println!("  kdf:        PBKDF2-HMAC-SHA256, {} iterations", status.kdf_iterations);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_variants() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(900), "15m");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(5400), "1h 30m");
    }

    #[tokio::test]
    async fn status_of_fresh_database_is_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LynqarConfig::default();
        config.storage.database_path = dir.path().join("s.db").to_string_lossy().into_owned();

        let status = collect_status(&config).await.unwrap();
        assert!(!status.initialized);
        assert_eq!(status.backend, "sqlite");
        assert_eq!(status.auto_lock_secs, 900);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["initialized"], false);
    }
}
