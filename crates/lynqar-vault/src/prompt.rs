// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase acquisition via TTY prompt or the LYNQAR_PASSPHRASE environment variable.

use std::io::IsTerminal;

use lynqar_core::LynqarError;
use secrecy::SecretString;

/// Environment variable consulted before prompting.
pub const PASSPHRASE_ENV_VAR: &str = "LYNQAR_PASSPHRASE";

fn from_env() -> Option<SecretString> {
    std::env::var(PASSPHRASE_ENV_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn read_hidden(prompt: &str) -> Result<SecretString, LynqarError> {
    rpassword::prompt_password(prompt)
        .map(SecretString::from)
        .map_err(|e| LynqarError::Internal(format!("failed to read passphrase: {e}")))
}

fn no_source() -> LynqarError {
    LynqarError::Config(format!(
        "no passphrase available: set {PASSPHRASE_ENV_VAR} or run interactively"
    ))
}

/// Master passphrase for unlocking.
///
/// `LYNQAR_PASSPHRASE` wins if set and non-empty; otherwise the user is
/// prompted on the terminal.
pub fn read_passphrase() -> Result<SecretString, LynqarError> {
    if let Some(secret) = from_env() {
        return Ok(secret);
    }
    if std::io::stdin().is_terminal() {
        return read_hidden("Master passphrase: ");
    }
    Err(no_source())
}

/// New passphrase and its confirmation, for vault setup.
///
/// With `LYNQAR_PASSPHRASE` set, the value serves as its own confirmation.
pub fn read_new_passphrase() -> Result<(SecretString, SecretString), LynqarError> {
    if let (Some(a), Some(b)) = (from_env(), from_env()) {
        return Ok((a, b));
    }
    if std::io::stdin().is_terminal() {
        let first = read_hidden("New master passphrase: ")?;
        let second = read_hidden("Confirm master passphrase: ")?;
        return Ok((first, second));
    }
    Err(no_source())
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn env_var_supplies_passphrase() {
        // SAFETY: serialized test-only env mutation.
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "correcthorse1") };
        let result = read_passphrase();
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "correcthorse1");
    }

    #[test]
    #[serial]
    fn env_var_confirms_itself() {
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "correcthorse1") };
        let result = read_new_passphrase();
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        let (a, b) = result.unwrap();
        assert_eq!(a.expose_secret(), b.expose_secret());
    }

    #[test]
    #[serial]
    fn empty_env_var_without_tty_fails() {
        unsafe { std::env::set_var(PASSPHRASE_ENV_VAR, "") };
        // Test harness stdin is not a terminal.
        let result = read_passphrase();
        unsafe { std::env::remove_var(PASSPHRASE_ENV_VAR) };

        if !std::io::stdin().is_terminal() {
            assert!(matches!(result, Err(LynqarError::Config(_))));
        }
    }
}
