// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::Serialize;
use std::fmt;

/// Server codes that end the session on the spot
pub const TOKEN_EXPIRED_CODES: [i64; 2] = [1050, 2000];

/// Code reported when the failure budget runs out
pub const MAX_FAILURE_CODE: i64 = -1;

pub const TOKEN_EXPIRED_MESSAGE: &str = "Login expired, please sign in again";
pub const MAX_FAILURE_MESSAGE: &str = "Heartbeat reached the maximum failure count";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionEndReason {
    /// Server answered 1050 or 2000
    TokenExpired,
    /// Too many consecutive failed probes
    MaxFailures,
}

/// Emitted once per escalation, after credentials are wiped
///
/// Listeners are expected to show `message` to the user before sending them
/// back to sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEnded {
    pub code: i64,
    pub message: String,
    pub reason: SessionEndReason,
}

impl SessionEnded {
    pub fn token_expired(code: i64, msg: Option<String>) -> Self {
        Self {
            code,
            message: msg
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| TOKEN_EXPIRED_MESSAGE.to_string()),
            reason: SessionEndReason::TokenExpired,
        }
    }

    pub fn max_failures() -> Self {
        Self {
            code: MAX_FAILURE_CODE,
            message: MAX_FAILURE_MESSAGE.to_string(),
            reason: SessionEndReason::MaxFailures,
        }
    }
}

impl fmt::Display for SessionEnded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session ended ({}): {}", self.code, self.message)
    }
}
