// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `init`, `add`, `list`, `remove`, `generate`.

use std::io::IsTerminal;
use std::sync::Arc;

use colored::Colorize;
use lynqar_config::LynqarConfig;
use lynqar_core::{Entry, EntryCollection, EntryId, LynqarError, NewEntry};
use lynqar_storage::SqliteStore;
use lynqar_vault::{
    classify, generate_password, read_new_passphrase, read_passphrase, strength, SessionGuard,
    SessionPolicy, SessionStatus, StrengthLabel, VaultStore,
};
use tracing::debug;

/// Shown instead of a password.
pub const MASK: &str = "••••••••";

/// Open the configured database and start a locked (or setup) session over it.
pub async fn open_session(config: &LynqarConfig) -> Result<Arc<SessionGuard>, LynqarError> {
    let store = SqliteStore::open(&config.storage).await?;
    let guard = SessionGuard::open(
        VaultStore::new(Arc::new(store)),
        SessionPolicy::from_config(config),
    )
    .await?;
    Ok(Arc::new(guard))
}

/// Prompt for the master passphrase and unlock.
pub async fn unlock(guard: &SessionGuard) -> Result<(), LynqarError> {
    match guard.status() {
        SessionStatus::Setup => Err(LynqarError::NotInitialized),
        SessionStatus::Unlocked => Ok(()),
        SessionStatus::Locked => guard.unlock(read_passphrase()?).await,
    }
}

pub async fn run_init(config: &LynqarConfig) -> Result<(), LynqarError> {
    let guard = open_session(config).await?;
    if guard.status() != SessionStatus::Setup {
        return Err(LynqarError::AlreadyInitialized);
    }
    let (passphrase, confirmation) = read_new_passphrase()?;
    guard.setup(passphrase, confirmation).await?;
    guard.close().await;
    println!(
        "{} vault created at {}",
        "✓".green(),
        config.storage.database_path
    );
    Ok(())
}

/// Fields for `lynqar add`.
#[derive(Debug, Default)]
pub struct AddArgs {
    pub title: String,
    pub username: Option<String>,
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub generate: bool,
}

/// Build the draft for `args`, filling in suggested tags and the password.
pub fn draft_from_args(args: AddArgs, password: String) -> NewEntry {
    let url = args.url.unwrap_or_default();
    let tags = if args.tags.is_empty() {
        classify(&url)
    } else {
        args.tags
    };
    NewEntry::new(args.title)
        .username(args.username.unwrap_or_default())
        .url(url)
        .tags(tags)
        .password(password)
}

fn entry_password(generate: bool) -> Result<String, LynqarError> {
    if generate {
        return Ok(generate_password(lynqar_vault::password::DEFAULT_LENGTH));
    }
    if std::io::stdin().is_terminal() {
        return rpassword::prompt_password("Entry password (blank for none): ")
            .map_err(|e| LynqarError::Internal(format!("failed to read password: {e}")));
    }
    Ok(String::new())
}

pub async fn run_add(config: &LynqarConfig, args: AddArgs) -> Result<(), LynqarError> {
    let guard = open_session(config).await?;
    unlock(&guard).await?;

    let generated = args.generate;
    let password = entry_password(generated)?;
    let rating = strength(&password);
    let entry = guard.add_entry(draft_from_args(args, password)).await?;
    guard.close().await;

    println!("{} added {}", "✓".green(), entry.title.bold());
    println!("  id:       {}", entry.id);
    if !entry.tags.is_empty() {
        println!("  tags:     {}", entry.tags.join(", "));
    }
    if generated {
        println!("  password: {} ({})", entry.password, paint_label(rating.label));
    } else if !entry.password.is_empty() {
        println!("  password: {} ({})", MASK, paint_label(rating.label));
    }
    Ok(())
}

pub async fn run_list(config: &LynqarConfig, query: Option<&str>) -> Result<(), LynqarError> {
    let guard = open_session(config).await?;
    unlock(&guard).await?;
    let hits = guard.search(query.unwrap_or("")).await?;
    guard.close().await;

    if hits.is_empty() {
        println!("{}", "no entries".dimmed());
        return Ok(());
    }
    for entry in &hits {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

pub async fn run_remove(config: &LynqarConfig, id: &str) -> Result<(), LynqarError> {
    let guard = open_session(config).await?;
    unlock(&guard).await?;
    let result = remove_by_prefix(&guard, id).await;
    guard.close().await;

    if result? {
        println!("{} removed {id}", "✓".green());
    } else {
        println!("{}", format!("no entry with id {id}").yellow());
    }
    Ok(())
}

/// Remove the entry whose id equals or uniquely starts with `text`.
pub async fn remove_by_prefix(guard: &SessionGuard, text: &str) -> Result<bool, LynqarError> {
    let entries = guard.entries().await?;
    let id = resolve_id(&entries, text)?;
    debug!(%id, "removing entry");
    guard.remove_entry(&id).await
}

/// Exact id, or the single entry whose id starts with `text`.
///
/// No match passes `text` through unchanged; more than one match is an error.
pub fn resolve_id(entries: &EntryCollection, text: &str) -> Result<EntryId, LynqarError> {
    let exact = EntryId::from(text);
    if entries.contains(&exact) || text.is_empty() {
        return Ok(exact);
    }
    let mut matches = entries.iter().filter(|e| e.id.as_str().starts_with(text));
    match (matches.next(), matches.next()) {
        (Some(one), None) => Ok(one.id.clone()),
        (Some(_), Some(_)) => Err(LynqarError::InvalidEntry(format!(
            "id prefix `{text}` matches more than one entry"
        ))),
        (None, _) => Ok(exact),
    }
}

pub fn run_generate(length: usize) {
    let password = generate_password(length);
    let rating = strength(&password);
    println!("{password}");
    eprintln!("strength: {} ({}/100)", paint_label(rating.label), rating.score);
}

pub fn paint_label(label: StrengthLabel) -> colored::ColoredString {
    let text = label.to_string();
    match label {
        StrengthLabel::Weak => text.red(),
        StrengthLabel::Fair => text.yellow(),
        StrengthLabel::Good => text.green(),
        StrengthLabel::Strong => text.bright_green(),
    }
}

/// One-line listing of an entry. The password is always masked.
pub fn format_entry(entry: &Entry) -> String {
    let mut line = format!("{}  {}", entry.id.as_str().dimmed(), entry.title.bold());
    if !entry.username.is_empty() {
        line.push_str(&format!("  {}", entry.username));
    }
    if !entry.url.is_empty() {
        line.push_str(&format!("  {}", entry.url.cyan()));
    }
    if !entry.tags.is_empty() {
        line.push_str(&format!("  [{}]", entry.tags.join(", ")));
    }
    if !entry.password.is_empty() {
        line.push_str(&format!("  {MASK}"));
    }
    line
}
