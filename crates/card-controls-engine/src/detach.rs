// card-controls-engine/src/detach.rs
// ============================================================================
// Module: Detached Side-Effect Tasks
// Description: Fire-and-forget task spawner with bounded timeouts.
// Purpose: Run side effects decoupled from the triggering request's scope.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! Event publication, owner notifications, and the gambling re-apply must
//! survive the parent response being returned, so they run as detached tokio
//! tasks outside the request's cancellation scope. Each task is bounded by a
//! timeout and its terminal outcome is always logged; errors are never
//! silently dropped. Handles are retained so tests can drain all pending
//! side effects deterministically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Detached Tasks
// ============================================================================

/// Spawner for fire-and-forget side-effect tasks.
#[derive(Clone)]
pub struct DetachedTasks {
    /// Timeout bound applied to every spawned task.
    timeout: Duration,
    /// Live task handles, retained for draining.
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl DetachedTasks {
    /// Creates a spawner with the given per-task timeout bound.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Spawns a detached side-effect task.
    ///
    /// The task runs to completion (or to the timeout bound) independently of
    /// the caller; its terminal outcome is logged under the given label.
    pub fn spawn<F, E>(&self, label: &'static str, work: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            match tokio::time::timeout(timeout, work).await {
                Ok(Ok(())) => tracing::debug!(label, "detached task completed"),
                Ok(Err(err)) => tracing::warn!(label, error = %err, "detached task failed"),
                Err(_) => tracing::warn!(label, timeout_ms = %timeout.as_millis(), "detached task timed out"),
            }
        });
        if let Ok(mut guard) = self.handles.lock() {
            guard.push(handle);
        }
    }

    /// Awaits every spawned task, including ones spawned while draining.
    ///
    /// Primarily for tests, which must observe detached side effects before
    /// asserting on collaborator state.
    pub async fn drain(&self) {
        loop {
            let pending = match self.handles.lock() {
                Ok(mut guard) => std::mem::take(&mut *guard),
                Err(_) => return,
            };
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(err) = handle.await {
                    tracing::warn!(error = %err, "detached task join failed");
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
