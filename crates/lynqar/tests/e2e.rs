// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the vault lifecycle.
//!
//! Each test builds an isolated TestHarness. The SQLite-backed tests use a
//! temp database so restarts exercise real persistence.

use std::collections::HashSet;
use std::time::Duration;

use lynqar_core::{KeyValueStore, LynqarError, NewEntry};
use lynqar_test_utils::{secret, TestHarness, FAST_KDF_ITERATIONS, TEST_PASSPHRASE};
use lynqar_vault::kdf::derive_key;
use lynqar_vault::{spawn_auto_lock, SessionStatus};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// ---- Test 1: First-run setup then lock and unlock ----

#[tokio::test]
async fn test_setup_lock_unlock_round_trip() {
    let mut harness = TestHarness::builder()
        .with_sqlite()
        .build()
        .await
        .unwrap();
    assert_eq!(harness.guard().status(), SessionStatus::Setup);

    harness
        .guard()
        .setup(secret(TEST_PASSPHRASE), secret(TEST_PASSPHRASE))
        .await
        .unwrap();
    assert!(harness.vault_store().is_initialized().await.unwrap());
    assert_eq!(harness.guard().status(), SessionStatus::Unlocked);

    assert!(harness.guard().lock().await);
    harness.restart().await.unwrap();
    assert_eq!(harness.guard().status(), SessionStatus::Locked);

    harness
        .guard()
        .unlock(secret(TEST_PASSPHRASE))
        .await
        .unwrap();
    let key = derive_key(TEST_PASSPHRASE.as_bytes(), FAST_KDF_ITERATIONS).unwrap();
    assert!(harness.vault_store().verify_passphrase(&key).await.unwrap());
    assert!(harness.guard().entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_setup_is_rejected() {
    let harness = TestHarness::builder()
        .set_up_with(TEST_PASSPHRASE)
        .build()
        .await
        .unwrap();
    let err = harness
        .guard()
        .setup(secret("another-pass"), secret("another-pass"))
        .await
        .unwrap_err();
    assert!(matches!(err, LynqarError::AlreadyInitialized));
}

// ---- Test 2: Entries persist across restarts ----

#[tokio::test]
async fn test_entry_survives_restart_with_suggested_tags() {
    let mut harness = TestHarness::builder()
        .with_sqlite()
        .set_up_with(TEST_PASSPHRASE)
        .build()
        .await
        .unwrap();

    let tags = lynqar_vault::classify("github.com");
    let added = harness
        .guard()
        .add_entry(
            NewEntry::new("GitHub")
                .username("octocat")
                .password("hunter22")
                .url("github.com")
                .tags(tags),
        )
        .await
        .unwrap();
    let expected: HashSet<&str> = ["Developer", "Work"].into();
    assert_eq!(
        added.tags.iter().map(String::as_str).collect::<HashSet<_>>(),
        expected
    );

    harness.guard().lock().await;
    harness.restart().await.unwrap();
    harness
        .guard()
        .unlock(secret(TEST_PASSPHRASE))
        .await
        .unwrap();

    let entries = harness.guard().entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    let reloaded = entries.get(&added.id).unwrap();
    assert_eq!(reloaded.title, "GitHub");
    assert_eq!(reloaded.password, "hunter22");
    assert_eq!(reloaded.tags, added.tags);
    assert_eq!(reloaded.created, added.created);
}

#[tokio::test]
async fn test_stored_collection_is_not_plaintext() {
    let harness = TestHarness::builder()
        .with_sqlite()
        .set_up_with(TEST_PASSPHRASE)
        .build()
        .await
        .unwrap();
    harness
        .guard()
        .add_entry(NewEntry::new("Mailbox").password("hunter22"))
        .await
        .unwrap();

    let raw = harness.kv().get("entries").await.unwrap().unwrap();
    let text = String::from_utf8_lossy(&raw);
    assert!(!text.contains("hunter22"));
    assert!(!text.contains("Mailbox"));
}

// ---- Test 3: Wrong passphrase ----

#[tokio::test]
async fn test_wrong_passphrase_is_rejected() {
    let harness = TestHarness::builder()
        .set_up_with(TEST_PASSPHRASE)
        .build()
        .await
        .unwrap();
    harness
        .guard()
        .add_entry(NewEntry::new("Bank"))
        .await
        .unwrap();
    harness.guard().lock().await;

    let err = harness
        .guard()
        .unlock(secret("wrongpass"))
        .await
        .unwrap_err();
    assert!(matches!(err, LynqarError::Authentication));
    assert_eq!(harness.guard().status(), SessionStatus::Locked);

    let wrong = derive_key(b"wrongpass", FAST_KDF_ITERATIONS).unwrap();
    assert!(!harness.vault_store().verify_passphrase(&wrong).await.unwrap());

    // The right passphrase still works after a failed attempt.
    harness
        .guard()
        .unlock(secret(TEST_PASSPHRASE))
        .await
        .unwrap();
    assert_eq!(harness.guard().entries().await.unwrap().len(), 1);
}

// ---- Test 4: Auto-lock ----

#[tokio::test(start_paused = true)]
async fn test_idle_session_auto_locks() {
    let harness = TestHarness::builder()
        .with_auto_lock(Duration::from_secs(1))
        .with_check_interval(Duration::from_millis(250))
        .set_up_with(TEST_PASSPHRASE)
        .build()
        .await
        .unwrap();
    let guard = harness.guard().clone();
    let cancel = CancellationToken::new();
    let task = spawn_auto_lock(guard.clone(), cancel.clone());

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(guard.status(), SessionStatus::Locked);
    assert!(matches!(
        guard.search("").await,
        Err(LynqarError::NotUnlocked)
    ));

    guard.unlock(secret(TEST_PASSPHRASE)).await.unwrap();
    assert_eq!(guard.status(), SessionStatus::Unlocked);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_auto_lock_latency_is_bounded() {
    let timeout = Duration::from_secs(5);
    let interval = Duration::from_secs(2);
    let harness = TestHarness::builder()
        .with_auto_lock(timeout)
        .with_check_interval(interval)
        .set_up_with(TEST_PASSPHRASE)
        .build()
        .await
        .unwrap();
    let guard = harness.guard().clone();
    let mut status = guard.subscribe();
    let cancel = CancellationToken::new();
    let task = spawn_auto_lock(guard.clone(), cancel.clone());

    let start = Instant::now();
    status
        .wait_for(|s| *s == SessionStatus::Locked)
        .await
        .unwrap();
    let latency = start.elapsed();
    assert!(latency > timeout);
    assert!(latency <= timeout + interval);

    cancel.cancel();
    task.await.unwrap();
}

// ---- Test 5: Locking clears secrets ----

#[tokio::test]
async fn test_lock_refuses_key_operations() {
    let harness = TestHarness::builder()
        .set_up_with(TEST_PASSPHRASE)
        .build()
        .await
        .unwrap();
    let entry = harness
        .guard()
        .add_entry(NewEntry::new("Mail"))
        .await
        .unwrap();
    assert!(harness.guard().lock().await);
    // Locking twice is a no-op.
    assert!(!harness.guard().lock().await);

    assert!(matches!(
        harness.guard().entries().await,
        Err(LynqarError::NotUnlocked)
    ));
    assert!(matches!(
        harness.guard().add_entry(NewEntry::new("Other")).await,
        Err(LynqarError::NotUnlocked)
    ));
    assert!(matches!(
        harness.guard().remove_entry(&entry.id).await,
        Err(LynqarError::NotUnlocked)
    ));
    assert!(matches!(
        harness.guard().reload().await,
        Err(LynqarError::NotUnlocked)
    ));
}

// ---- Test 6: Identifier uniqueness ----

#[tokio::test]
async fn test_ids_stay_unique_across_adds_and_removes() {
    let harness = TestHarness::builder()
        .set_up_with(TEST_PASSPHRASE)
        .build()
        .await
        .unwrap();
    let guard = harness.guard();

    let mut added = Vec::new();
    let mut removed = HashSet::new();
    for i in 0..20 {
        let entry = guard
            .add_entry(NewEntry::new(format!("entry {i}")))
            .await
            .unwrap();
        added.push(entry.id.clone());
        if i % 3 == 0 {
            let victim = added[i / 2].clone();
            assert!(guard.remove_entry(&victim).await.unwrap());
            removed.insert(victim);
        }
    }

    // Every add got an id never handed out before, deletions included.
    assert_eq!(added.iter().collect::<HashSet<_>>().len(), 20);

    let entries = guard.entries().await.unwrap();
    let ids: HashSet<_> = entries.iter().map(|e| e.id.clone()).collect();
    assert_eq!(ids.len(), entries.len());
    assert_eq!(entries.len(), 20 - removed.len());
    assert!(ids.is_disjoint(&removed));
    assert_eq!(guard.reload().await.unwrap(), entries.len());
}
