// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation and a coarse strength estimate.

use rand::rngs::OsRng;
use rand::Rng;
use strum::Display;

/// Characters drawn by [`generate_password`].
pub const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

pub const DEFAULT_LENGTH: usize = 16;

/// A random password of `length` characters from [`CHARSET`], using the OS CSPRNG.
pub fn generate_password(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum StrengthLabel {
    Weak,
    Fair,
    Good,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strength {
    /// 0 to 100 in steps of 25.
    pub score: u8,
    pub label: StrengthLabel,
}

/// Score a password on four criteria worth 25 points each: at least eight
/// characters, a lowercase letter, an uppercase letter together with a
/// digit, and a non-alphanumeric character.
pub fn strength(password: &str) -> Strength {
    let has = |pred: fn(char) -> bool| password.chars().any(pred);

    let mut score = 0u8;
    if password.chars().count() >= 8 {
        score += 25;
    }
    if has(|c| c.is_ascii_lowercase()) {
        score += 25;
    }
    if has(|c| c.is_ascii_uppercase()) && has(|c| c.is_ascii_digit()) {
        score += 25;
    }
    if has(|c| !c.is_ascii_alphanumeric()) {
        score += 25;
    }

    let label = match score {
        0..=49 => StrengthLabel::Weak,
        50..=74 => StrengthLabel::Fair,
        75..=99 => StrengthLabel::Good,
        _ => StrengthLabel::Strong,
    };
    Strength { score, label }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_password_uses_charset() {
        let pw = generate_password(DEFAULT_LENGTH);
        assert_eq!(pw.len(), DEFAULT_LENGTH);
        assert!(pw.bytes().all(|b| CHARSET.contains(&b)));
    }

    #[test]
    fn generated_passwords_differ() {
        let seen: HashSet<String> = (0..32).map(|_| generate_password(20)).collect();
        assert_eq!(seen.len(), 32);
    }

    #[test]
    fn zero_length_is_empty() {
        assert!(generate_password(0).is_empty());
    }

    #[test]
    fn strength_scores() {
        assert_eq!(strength(""), Strength { score: 0, label: StrengthLabel::Weak });
        assert_eq!(strength("abc").score, 25);
        assert_eq!(strength("abcdefgh").label, StrengthLabel::Fair);
        assert_eq!(strength("abcdefG1").label, StrengthLabel::Good);
        assert_eq!(strength("abcdefG1!").label, StrengthLabel::Strong);
    }

    #[test]
    fn uppercase_without_digit_earns_nothing() {
        assert_eq!(strength("abcdefGH").score, 50);
        assert_eq!(strength("abcdefg1").score, 50);
    }

    #[test]
    fn non_ascii_counts_as_symbol() {
        assert_eq!(strength("é").score, 25);
    }

    #[test]
    fn label_display() {
        assert_eq!(StrengthLabel::Strong.to_string(), "Strong");
    }
}
