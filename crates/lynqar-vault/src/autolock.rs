// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background task that locks an idle session.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::session::SessionGuard;

/// Spawn the periodic idle check for `guard`.
///
/// Runs every `policy().check_interval` until `cancel` fires. A lock is
/// detected at most one interval after the timeout elapses.
pub fn spawn_auto_lock(guard: Arc<SessionGuard>, cancel: CancellationToken) -> JoinHandle<()> {
    let period = guard.policy().check_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first immediate tick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("auto-lock task stopped");
                    break;
                }
                _ = interval.tick() => {
                    guard.check_idle().await;
                }
            }
        }
    })
}
