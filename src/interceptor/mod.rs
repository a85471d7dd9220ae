// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request/Response Interceptor
//!
//! Outbound (`adapt`):
//!
//! 1. Body (or `{}`) is normalized through a JSON parse and reprint
//! 2. Normalized body is AES-encrypted with the program secret and base64'd
//! 3. A fresh nonce/time pair is signed over the canonical string
//! 4. Ciphertext replaces the body and the `ka-*` headers are attached
//!
//! Inbound (`verify`):
//!
//! 1. Body is parsed as an envelope; non-success envelopes come back as-is
//! 2. `data` is base64-decoded and AES-decrypted
//! 3. A rebuilt envelope with `data` as a nested JSON object is returned
//!
//! Both directions only read the configuration and the credential store, so
//! one interceptor can serve concurrent requests.

pub mod envelope;
pub mod error;
pub mod headers;
pub mod http;

pub use envelope::{ApiResult, ParsedResponse, RebuiltEnvelope, SUCCESS_CODE};
pub use error::KauthError;
pub use http::{HttpRequest, HttpResponse};

use chrono::Utc;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::crypto::{aes_decrypt_base64, aes_encrypt_base64};
use crate::signature::{verify_response_signature, SignatureEnvelope};
use crate::storage::CredentialStore;

/// Body signed and encrypted when a request has none
pub const EMPTY_BODY: &str = "{}";

/// Response-side checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct InterceptorOptions {
    /// Require and check `ka-*` headers on successful responses
    pub verify_response_signature: bool,
    /// Maximum age of a response `ka-time`, in milliseconds
    pub timestamp_tolerance_ms: i64,
}

impl Default for InterceptorOptions {
    fn default() -> Self {
        Self {
            verify_response_signature: false,
            timestamp_tolerance_ms: 120_000,
        }
    }
}

/// Normalize a request body into the exact string that is signed and encrypted
///
/// Missing, empty or non-UTF-8 bodies become `{}`. Valid JSON is reprinted
/// compactly; anything else passes through untouched.
pub fn normalize_body(body: Option<&[u8]>) -> String {
    let text = match body.map(std::str::from_utf8) {
        Some(Ok(text)) if !text.is_empty() => text,
        _ => return EMPTY_BODY.to_string(),
    };

    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|value| serde_json::to_string(&value).ok())
        .unwrap_or_else(|| text.to_string())
}

struct ResponseSignature {
    nonce: String,
    time: i64,
    sign: String,
}

#[derive(Clone)]
pub struct Interceptor {
    config: Arc<ServiceConfig>,
    credentials: CredentialStore,
    options: InterceptorOptions,
}

impl Interceptor {
    pub fn new(config: Arc<ServiceConfig>, credentials: CredentialStore) -> Self {
        Self::with_options(config, credentials, InterceptorOptions::default())
    }

    pub fn with_options(
        config: Arc<ServiceConfig>,
        credentials: CredentialStore,
        options: InterceptorOptions,
    ) -> Self {
        Self {
            config,
            credentials,
            options,
        }
    }

    /// Encrypt the body, sign, and attach the signature headers
    pub fn adapt(&self, mut request: HttpRequest) -> Result<HttpRequest, KauthError> {
        let body = normalize_body(request.body.as_deref());

        let ciphertext = aes_encrypt_base64(&body, &self.config.program_secret)
            .map_err(KauthError::encryption)?;

        let device_id = self.credentials.device_id();
        let envelope = SignatureEnvelope::build(
            &self.config,
            &device_id,
            self.credentials.token(),
            request.path(),
            &body,
        )
        .map_err(KauthError::signing)?;

        debug!(
            "Signed {} {} (nonce {}, time {})",
            request.method,
            request.path(),
            envelope.nonce,
            envelope.time
        );

        request.body = Some(ciphertext.into_bytes());
        headers::attach_signature(&mut request.headers, envelope)?;
        Ok(request)
    }

    /// Validate, decrypt and rebuild a response body
    ///
    /// Non-success envelopes are returned byte for byte. If the rebuilt
    /// envelope cannot be serialized the raw body is returned instead.
    pub fn verify(
        &self,
        response: &HttpResponse,
        request: &HttpRequest,
    ) -> Result<Vec<u8>, KauthError> {
        let parsed = ParsedResponse::parse(&response.body).map_err(|e| {
            warn!("Failed to parse response for {}: {}", request.path(), e);
            e
        })?;

        if !parsed.is_success_value() {
            info!(
                "Response for {} not successful (code {:?}), passing through",
                request.path(),
                parsed.code
            );
            return Ok(response.body.clone());
        }

        let signature = if self.options.verify_response_signature {
            Some(self.require_signature_headers(&response.headers)?)
        } else {
            optional_signature_headers(&response.headers)
        };

        let plaintext = match parsed.ciphertext() {
            Some(ciphertext) => Some(
                aes_decrypt_base64(ciphertext, &self.config.program_secret)
                    .map_err(KauthError::decryption)?,
            ),
            None => {
                debug!("Response for {} carries no data", request.path());
                None
            }
        };

        if let Some(signature) = signature {
            let valid = verify_response_signature(
                &self.config,
                request.path(),
                plaintext.as_deref(),
                &signature.nonce,
                signature.time,
                &signature.sign,
            );
            if !valid {
                if self.options.verify_response_signature {
                    return Err(KauthError::SignatureVerificationFailed);
                }
                debug!("Response signature for {} did not verify (not enforced)", request.path());
            }
        }

        let rebuilt = RebuiltEnvelope::from_parsed(&parsed, plaintext.as_deref());
        match serde_json::to_vec(&rebuilt) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                warn!("Failed to serialize rebuilt envelope: {}", e);
                Ok(response.body.clone())
            }
        }
    }

    fn require_signature_headers(&self, map: &HeaderMap) -> Result<ResponseSignature, KauthError> {
        let require = |name: &str| {
            headers::header_str(map, name).ok_or_else(|| KauthError::MissingHeader(name.to_string()))
        };

        let nonce = require(headers::NONCE)?;
        let time = require(headers::TIME)?
            .parse::<i64>()
            .map_err(|_| KauthError::MissingHeader(headers::TIME.to_string()))?;
        let sign = require(headers::SIGN)?;
        require(headers::SIGN_TYPE)?;

        let now = Utc::now().timestamp_millis();
        if now - time > self.options.timestamp_tolerance_ms {
            warn!("Response timestamp {} is {} ms old", time, now - time);
            return Err(KauthError::TimestampExpired);
        }

        Ok(ResponseSignature {
            nonce: nonce.to_string(),
            time,
            sign: sign.to_string(),
        })
    }
}

fn optional_signature_headers(map: &HeaderMap) -> Option<ResponseSignature> {
    Some(ResponseSignature {
        nonce: headers::header_str(map, headers::NONCE)?.to_string(),
        time: headers::header_str(map, headers::TIME)?.parse().ok()?,
        sign: headers::header_str(map, headers::SIGN)?.to_string(),
    })
}
