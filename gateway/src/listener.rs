//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Listener shutdown plumbing
//!
//! Each protocol listener hands back a [`StopHandle`] when it starts. The
//! handle signals the listener to stop accepting new work and waits for
//! in-flight requests to drain, bounded by a deadline.

use crate::error::GatewayError;
use std::time::Duration;
use tokio::sync::watch;

/// Handle to a running listener.
///
/// Stopping is idempotent: a listener that already exited (or crashed)
/// reports a clean stop rather than an error.
pub struct StopHandle {
    name: &'static str,
    shutdown_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
}

/// Listener-side completion signal, flipped when the serve loop returns.
pub struct DoneGuard {
    done_tx: watch::Sender<bool>,
}

impl DoneGuard {
    /// Mark the listener as fully drained. Called on every exit path.
    pub fn finish(&self) {
        let _ = self.done_tx.send(true);
    }
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

impl StopHandle {
    /// Create a handle pair for a new listener.
    ///
    /// Returns the handle, the shutdown receiver the serve loop watches,
    /// and the guard the serve loop holds until it has drained.
    pub fn new(name: &'static str) -> (Self, watch::Receiver<bool>, DoneGuard) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);
        let handle = Self {
            name,
            shutdown_tx,
            done_rx,
        };
        (handle, shutdown_rx, DoneGuard { done_tx })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolves when the serve loop exits. Lets the process notice a
    /// listener dying without having been asked to stop.
    pub async fn exited(&mut self) {
        if *self.done_rx.borrow() {
            return;
        }
        let _ = self.done_rx.changed().await;
    }

    /// Signal shutdown and wait up to `deadline` for in-flight requests to
    /// drain. A listener that has already exited stops immediately.
    pub async fn stop(mut self, deadline: Duration) -> Result<(), GatewayError> {
        tracing::info!("Stopping {} listener", self.name);
        let _ = self.shutdown_tx.send(true);

        if *self.done_rx.borrow() {
            return Ok(());
        }

        match tokio::time::timeout(deadline, self.done_rx.changed()).await {
            // Drained, or the listener task dropped its guard.
            Ok(_) => {
                tracing::info!("{} listener stopped", self.name);
                Ok(())
            }
            Err(_) => Err(GatewayError::Listener(format!(
                "{} listener did not drain within {:?}",
                self.name, deadline
            ))),
        }
    }
}

/// Wait for a process-level shutdown request (SIGINT or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install SIGINT handler: {}", error);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install SIGTERM handler: {}", error);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
