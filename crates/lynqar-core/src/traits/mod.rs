// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the vault engine and its collaborators.

pub mod store;

pub use store::{KeyValueStore, ENTRIES_KEY, MARKER_KEY};
