// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod events;
pub mod monitor;
pub mod probe;

pub use events::{
    SessionEndReason, SessionEnded, MAX_FAILURE_CODE, MAX_FAILURE_MESSAGE, TOKEN_EXPIRED_CODES,
    TOKEN_EXPIRED_MESSAGE,
};
pub use monitor::{LivenessConfig, LivenessMonitor};
pub use probe::{LivenessProbe, ProbeOutcome};
