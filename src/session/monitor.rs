// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session liveness monitor
//!
//! ```text
//!            start()                    probe 200 -> failures = 0
//!  Stopped ----------> Running ------+  probe !200 / error -> failures += 1
//!     ^                   |          |
//!     +------ stop() -----+          +- 1050/2000, or failures >= max
//!     +---- escalation ---------------+   -> wipe credentials, SessionEnded
//! ```
//!
//! Each `start()` opens a new generation with its own cancellation token.
//! Outcomes that arrive for an older generation, or after `stop()`, are
//! dropped and cannot bring the monitor back to running.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::{SessionEnded, TOKEN_EXPIRED_CODES};
use super::probe::{LivenessProbe, ProbeOutcome};
use crate::interceptor::SUCCESS_CODE;
use crate::storage::CredentialStore;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LivenessConfig {
    pub interval_secs: u64,
    pub max_failure_count: u32,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            interval_secs: 120,
            max_failure_count: 3,
        }
    }
}

impl LivenessConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

type SessionEndedCallback = Arc<dyn Fn(SessionEnded) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Default)]
struct MonitorState {
    running: bool,
    failure_count: u32,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl MonitorState {
    fn halt(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.running = false;
        self.failure_count = 0;
    }
}

struct MonitorInner {
    probe: Arc<dyn LivenessProbe>,
    credentials: CredentialStore,
    config: LivenessConfig,
    state: Mutex<MonitorState>,
    listeners: RwLock<Vec<SessionEndedCallback>>,
}

/// Periodic liveness checker; clones share one monitor
#[derive(Clone)]
pub struct LivenessMonitor {
    inner: Arc<MonitorInner>,
}

impl LivenessMonitor {
    pub fn new(
        probe: Arc<dyn LivenessProbe>,
        credentials: CredentialStore,
        config: LivenessConfig,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                probe,
                credentials,
                config,
                state: Mutex::new(MonitorState::default()),
                listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Start probing; returns `false` if already running
    ///
    /// The first probe fires immediately, then every interval.
    pub async fn start(&self) -> bool {
        let (generation, token) = {
            let mut state = self.inner.state.lock().await;
            if state.running {
                debug!("Liveness monitor already running");
                return false;
            }
            state.running = true;
            state.failure_count = 0;
            state.generation += 1;
            let token = CancellationToken::new();
            state.cancel = Some(token.clone());
            (state.generation, token)
        };

        info!(
            "Liveness monitor started (generation {}, every {:?})",
            generation,
            self.inner.config.interval()
        );

        let monitor = self.clone();
        tokio::spawn(async move {
            monitor.run(generation, token).await;
        });
        true
    }

    /// Stop probing; returns `false` if already stopped
    ///
    /// An in-flight probe is left to finish and its outcome is discarded.
    pub async fn stop(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        if !state.running {
            return false;
        }
        state.halt();
        info!("Liveness monitor stopped");
        true
    }

    pub async fn is_running(&self) -> bool {
        self.inner.state.lock().await.running
    }

    pub async fn failure_count(&self) -> u32 {
        self.inner.state.lock().await.failure_count
    }

    /// Register a session-ended listener
    ///
    /// Listeners run in registration order and are all awaited before the
    /// escalation completes.
    pub async fn on_session_ended<F>(&self, callback: F)
    where
        F: Fn(SessionEnded) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        self.inner.listeners.write().await.push(Arc::new(callback));
    }

    async fn run(&self, generation: u64, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.inner.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let outcome = self.inner.probe.probe().await;
            self.handle_outcome(generation, outcome).await;
        }

        debug!("Liveness loop for generation {} exited", generation);
    }

    async fn handle_outcome(&self, generation: u64, outcome: ProbeOutcome) {
        let ended = {
            let mut state = self.inner.state.lock().await;
            if !state.running || state.generation != generation {
                debug!("Dropping probe outcome from stale generation {}", generation);
                return;
            }

            let max = self.inner.config.max_failure_count;
            let ended = match outcome {
                ProbeOutcome::Envelope { code, .. } if code == SUCCESS_CODE => {
                    state.failure_count = 0;
                    debug!("Liveness probe ok");
                    None
                }
                ProbeOutcome::Envelope { code, msg } => {
                    state.failure_count += 1;
                    warn!(
                        "Liveness probe failed: code {} msg {:?} ({} consecutive)",
                        code, msg, state.failure_count
                    );
                    if TOKEN_EXPIRED_CODES.contains(&code) {
                        Some(SessionEnded::token_expired(code, msg))
                    } else if state.failure_count >= max {
                        Some(SessionEnded::max_failures())
                    } else {
                        None
                    }
                }
                ProbeOutcome::TransportFailure(detail) => {
                    state.failure_count += 1;
                    warn!(
                        "Liveness probe transport failure: {} ({} consecutive)",
                        detail, state.failure_count
                    );
                    (state.failure_count >= max).then(SessionEnded::max_failures)
                }
            };

            // Stop under the same lock so only one escalation can win
            if ended.is_some() {
                state.halt();
            }
            ended
        };

        if let Some(ended) = ended {
            self.escalate(ended).await;
        }
    }

    async fn escalate(&self, ended: SessionEnded) {
        warn!("Ending session: {}", ended);
        self.inner.credentials.clear_all();

        // Snapshot so a listener may register further listeners
        let listeners: Vec<SessionEndedCallback> =
            self.inner.listeners.read().await.iter().cloned().collect();
        for listener in listeners {
            listener(ended.clone()).await;
        }
    }
}
