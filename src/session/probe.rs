// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;

/// What one liveness call produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Server answered with an envelope
    Envelope { code: i64, msg: Option<String> },
    /// No envelope: network error, undecryptable or unparsable response
    TransportFailure(String),
}

/// Issues one liveness call
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;
}
