// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lynqar integration tests.
//!
//! - [`FlakyStore`] - in-memory substrate with injectable failures
//! - [`TestHarness`] - session assembly with a fast KDF policy

pub mod flaky_store;
pub mod harness;

pub use flaky_store::FlakyStore;
pub use harness::{secret, TestHarness, FAST_KDF_ITERATIONS, TEST_PASSPHRASE};
