// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use reqwest::Method;
use serde::Serialize;

pub const PONG_PATH: &str = "/api/consumer/user/pong";

/// One API call: path, method and optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub path: String,
    pub method: Method,
    pub body: Option<Vec<u8>>,
}

impl Endpoint {
    /// POST with no body
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::POST,
            body: None,
        }
    }

    /// Serialize `body` as JSON, keeping its field names as-is
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Liveness call used by the session monitor
    pub fn pong() -> Self {
        Self::new(PONG_PATH)
    }
}
