// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response envelope shapes
//!
//! The server wraps every payload as
//! `{msg, data, code, traceId, elapse, respTime, isSuccess}` with `data`
//! holding base64 AES ciphertext. After decryption the client hands callers a
//! rebuilt `{msg, code, traceId, elapse, respTime, success, data?}` where
//! `data` is the decrypted JSON object itself.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::KauthError;

pub const SUCCESS_CODE: i64 = 200;

/// Envelope exactly as the server sent it; every field optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResponse {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trace_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub elapse: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub resp_time: Option<String>,
    #[serde(default)]
    pub is_success: Option<bool>,
}

// Some gateways send elapse/respTime as numbers
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl ParsedResponse {
    /// Parse a raw response body
    ///
    /// Anything that is not a JSON object is `ResponseParseFailed`; missing
    /// fields are fine.
    pub fn parse(raw: &[u8]) -> Result<Self, KauthError> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| KauthError::ResponseParseFailed(e.to_string()))?;
        if !value.is_object() {
            return Err(KauthError::ResponseParseFailed(
                "response body is not a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| KauthError::ResponseParseFailed(e.to_string()))
    }

    /// `code == 200` or `isSuccess == true`
    pub fn is_success_value(&self) -> bool {
        self.code == Some(SUCCESS_CODE) || self.is_success == Some(true)
    }

    /// Ciphertext, if present and non-empty
    pub fn ciphertext(&self) -> Option<&str> {
        self.data.as_deref().filter(|d| !d.is_empty())
    }
}

/// Envelope handed to callers after decryption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuiltEnvelope {
    pub msg: String,
    pub code: i64,
    pub trace_id: String,
    pub elapse: String,
    pub resp_time: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl RebuiltEnvelope {
    /// Rebuild from the parsed envelope and the decrypted plaintext
    ///
    /// `data` is kept only when the plaintext is a JSON object.
    pub fn from_parsed(parsed: &ParsedResponse, plaintext: Option<&str>) -> Self {
        let data = plaintext
            .and_then(|text| serde_json::from_str::<Value>(text).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            });

        Self {
            msg: parsed.msg.clone().unwrap_or_default(),
            code: parsed.code.unwrap_or(0),
            trace_id: parsed.trace_id.clone().unwrap_or_default(),
            elapse: parsed.elapse.clone().unwrap_or_default(),
            resp_time: parsed.resp_time.clone().unwrap_or_default(),
            success: parsed.is_success_value(),
            data,
        }
    }
}

/// Typed view of an envelope for business callers
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResult<T> {
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trace_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub elapse: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub resp_time: Option<String>,
}

impl<T> ApiResult<T> {
    pub fn is_success(&self) -> bool {
        self.code == Some(SUCCESS_CODE)
    }
}
