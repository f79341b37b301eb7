// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lynqar vault.
//!
//! Provides the shared error taxonomy, the credential entry model, and the
//! key-value storage trait that persistence backends implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LynqarError;
pub use traits::{KeyValueStore, ENTRIES_KEY, MARKER_KEY};
pub use types::{Entry, EntryCollection, EntryId, NewEntry, MAX_TAGS};
