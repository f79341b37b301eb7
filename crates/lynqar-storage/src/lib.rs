// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable key-value substrate for the Lynqar vault.
//!
//! The vault only ever stores opaque bytes under two logical keys, so the
//! schema is a single `settings` table managed by embedded migrations.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use database::Database;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
