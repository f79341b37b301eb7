// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lynqar shell` command implementation.
//!
//! Unlocks once and keeps the session open across commands until the user
//! quits or the auto-lock task locks it. A locked shell asks for the
//! passphrase again before the next command that needs the key.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::Colorize;
use lynqar_config::LynqarConfig;
use lynqar_core::{LynqarError, NewEntry};
use lynqar_vault::{
    classify, generate_password, read_new_passphrase, read_passphrase, spawn_auto_lock, strength,
    SessionGuard, SessionStatus,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::commands::{format_entry, open_session, paint_label, remove_by_prefix};

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List(Option<String>),
    Search(String),
    Add(String),
    Remove(String),
    Generate(usize),
    Lock,
    Status,
    Help,
    Quit,
}

impl ShellCommand {
    fn needs_key(&self) -> bool {
        matches!(
            self,
            Self::List(_) | Self::Search(_) | Self::Add(_) | Self::Remove(_)
        )
    }
}

const HELP: &str = "\
commands:
  list [query]     list entries, optionally filtered
  search <query>   entries whose title or username matches
  add <title>      add an entry (prompts for the rest)
  rm <id>          remove an entry by id or unique id prefix
  gen [length]     generate a password
  lock             lock the vault now
  status           session state
  help             this text
  quit             leave the shell";

/// Parse one input line. Leading `/` is accepted on every command.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    match word {
        "list" | "ls" => Ok(ShellCommand::List(arg)),
        "search" | "find" => arg
            .map(ShellCommand::Search)
            .ok_or_else(|| "usage: search <query>".to_string()),
        "add" => arg
            .map(ShellCommand::Add)
            .ok_or_else(|| "usage: add <title>".to_string()),
        "rm" | "remove" => arg
            .map(ShellCommand::Remove)
            .ok_or_else(|| "usage: rm <id>".to_string()),
        "gen" | "generate" => match arg {
            None => Ok(ShellCommand::Generate(
                lynqar_vault::password::DEFAULT_LENGTH,
            )),
            Some(n) => match n.parse::<usize>() {
                Ok(len) if len > 0 => Ok(ShellCommand::Generate(len)),
                _ => Err(format!("invalid length `{n}`")),
            },
        },
        "lock" => Ok(ShellCommand::Lock),
        "status" => Ok(ShellCommand::Status),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command `{other}`, type `help`")),
    }
}

/// Runs the `lynqar shell` interactive REPL.
pub async fn run_shell(config: LynqarConfig) -> Result<(), LynqarError> {
    let guard = open_session(&config).await?;

    if guard.is_initialized() {
        unlock_interactive(&guard).await?;
    } else {
        println!("{}", "No vault found. Choose a master passphrase.".yellow());
        let (passphrase, confirmation) = tokio::task::block_in_place(read_new_passphrase)?;
        guard.setup(passphrase, confirmation).await?;
        println!("{} vault created", "✓".green());
    }

    let cancel = CancellationToken::new();
    let manual_lock = Arc::new(AtomicBool::new(false));
    let auto_lock = spawn_auto_lock(guard.clone(), cancel.clone());
    let notifier = spawn_lock_notifier(guard.subscribe(), manual_lock.clone(), cancel.clone());

    let result = repl(&guard, &manual_lock).await;

    cancel.cancel();
    let _ = auto_lock.await;
    let _ = notifier.await;
    guard.close().await;
    result
}

async fn repl(guard: &Arc<SessionGuard>, manual_lock: &AtomicBool) -> Result<(), LynqarError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| LynqarError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "lynqar shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "help".yellow(), "quit".yellow());

    let prompt = format!("{}> ", "lynqar".green());
    loop {
        match tokio::task::block_in_place(|| rl.readline(&prompt)) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let command = match parse_command(trimmed) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => command,
                    Err(message) => {
                        eprintln!("{}", message.yellow());
                        continue;
                    }
                };

                if command.needs_key() && guard.status() == SessionStatus::Locked {
                    if let Err(e) = unlock_interactive(guard).await {
                        eprintln!("{}: {e}", "error".red());
                        continue;
                    }
                }
                guard.touch();

                if let Err(e) = execute(guard, &mut rl, command, manual_lock).await {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }
    Ok(())
}

async fn unlock_interactive(guard: &SessionGuard) -> Result<(), LynqarError> {
    let passphrase = tokio::task::block_in_place(read_passphrase)?;
    guard.unlock(passphrase).await?;
    println!("{}", "unlocked".green());
    Ok(())
}

async fn execute(
    guard: &SessionGuard,
    rl: &mut DefaultEditor,
    command: ShellCommand,
    manual_lock: &AtomicBool,
) -> Result<(), LynqarError> {
    match command {
        ShellCommand::List(query) => print_entries(guard, query.as_deref().unwrap_or("")).await,
        ShellCommand::Search(query) => print_entries(guard, &query).await,
        ShellCommand::Add(title) => {
            let (draft, generated) = prompt_draft(rl, guard, title)?;
            // Locked during the prompts anyway: unlock again and keep the draft.
            if guard.status() == SessionStatus::Locked {
                unlock_interactive(guard).await?;
            }
            let entry = guard.add_entry(draft).await?;
            println!("{} added {} ({})", "✓".green(), entry.title.bold(), entry.id);
            if !entry.tags.is_empty() {
                println!("  tags: {}", entry.tags.join(", "));
            }
            if let Some(password) = generated {
                println!("  password: {password}");
            }
            Ok(())
        }
        ShellCommand::Remove(id) => {
            if remove_by_prefix(guard, &id).await? {
                println!("{} removed", "✓".green());
            } else {
                println!("{}", format!("no entry with id {id}").yellow());
            }
            Ok(())
        }
        ShellCommand::Generate(length) => {
            let password = generate_password(length);
            let rating = strength(&password);
            println!("{password}  {}", paint_label(rating.label));
            Ok(())
        }
        ShellCommand::Lock => {
            manual_lock.store(true, Ordering::SeqCst);
            if !guard.lock().await {
                manual_lock.store(false, Ordering::SeqCst);
            }
            println!("{}", "locked".dimmed());
            Ok(())
        }
        ShellCommand::Status => {
            println!("  state:   {}", guard.status());
            println!("  backend: {}", guard.backend());
            println!("  idle:    {}s", guard.idle_for().as_secs());
            println!(
                "  lock:    after {}s idle",
                guard.policy().auto_lock.as_secs()
            );
            Ok(())
        }
        ShellCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        ShellCommand::Quit => Ok(()),
    }
}

async fn print_entries(guard: &SessionGuard, query: &str) -> Result<(), LynqarError> {
    let hits = guard.search(query).await?;
    if hits.is_empty() {
        println!("{}", "no entries".dimmed());
    }
    for entry in &hits {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn read_field(rl: &mut DefaultEditor, prompt: &str) -> Result<String, LynqarError> {
    tokio::task::block_in_place(|| rl.readline(prompt))
        .map(|line| line.trim().to_string())
        .map_err(|e| LynqarError::Internal(format!("input aborted: {e}")))
}

/// Fields asked for by `add` after the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftField {
    Username,
    Url,
    Password,
}

fn prompt_draft(
    rl: &mut DefaultEditor,
    guard: &SessionGuard,
    title: String,
) -> Result<(NewEntry, Option<String>), LynqarError> {
    collect_draft(guard, title, |field| match field {
        DraftField::Username => read_field(rl, "  username: "),
        DraftField::Url => read_field(rl, "  url: "),
        DraftField::Password => tokio::task::block_in_place(|| {
            rpassword::prompt_password("  password (blank to generate): ")
        })
        .map_err(|e| LynqarError::Internal(format!("failed to read password: {e}"))),
    })
}

/// Build a draft from `read`, touching the session after every field so a
/// slow entry does not trip the auto-lock. A blank password is generated and
/// returned alongside the draft so it can be shown once.
fn collect_draft(
    guard: &SessionGuard,
    title: String,
    mut read: impl FnMut(DraftField) -> Result<String, LynqarError>,
) -> Result<(NewEntry, Option<String>), LynqarError> {
    let mut next = |field| {
        let value = read(field);
        guard.touch();
        value
    };
    let username = next(DraftField::Username)?;
    let url = next(DraftField::Url)?;
    let password = next(DraftField::Password)?;

    let (password, generated) = if password.is_empty() {
        let generated = generate_password(lynqar_vault::password::DEFAULT_LENGTH);
        (generated.clone(), Some(generated))
    } else {
        (password, None)
    };

    let tags = classify(&url);
    let draft = NewEntry::new(title)
        .username(username)
        .url(url)
        .tags(tags)
        .password(password);
    Ok((draft, generated))
}

/// Print a notice when the session locks without the user asking.
fn spawn_lock_notifier(
    mut status: watch::Receiver<SessionStatus>,
    manual_lock: Arc<AtomicBool>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *status.borrow_and_update();
                    if current != SessionStatus::Locked {
                        continue;
                    }
                    if manual_lock.swap(false, Ordering::SeqCst) {
                        debug!("manual lock observed");
                    } else {
                        println!(
                            "\n{}",
                            "vault auto-locked after inactivity; the next command will ask for the passphrase"
                                .yellow()
                        );
                    }
                }
            }
        }
    })
}
