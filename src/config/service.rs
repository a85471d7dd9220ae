// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// API domain used when configuration leaves it empty
pub const DEFAULT_API_DOMAIN: &str = "https://api.kauth.cn";

fn default_api_domain() -> String {
    DEFAULT_API_DOMAIN.to_string()
}

/// Signature scheme applied to the canonical-string digest
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum SignType {
    /// Digest encrypted with the merchant public key
    #[default]
    Rsa,
    /// HMAC-SHA256 of the digest keyed with the merchant key string
    HmacSha256,
}

impl SignType {
    /// Wire name sent in the `ka-sign-type` header
    pub fn as_str(&self) -> &'static str {
        match self {
            SignType::Rsa => "RSA",
            SignType::HmacSha256 => "HMAC_SHA256",
        }
    }

    /// `HMAC_SHA256` in any case selects HMAC, everything else selects RSA
    pub fn parse_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("HMAC_SHA256") {
            SignType::HmacSha256
        } else {
            SignType::Rsa
        }
    }
}

impl From<String> for SignType {
    fn from(value: String) -> Self {
        SignType::parse_lenient(&value)
    }
}

impl From<SignType> for String {
    fn from(value: SignType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required field was empty; the message is the caller-visible failure string
    #[error("fail:{0} must not be empty")]
    MissingField(&'static str),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Service configuration shared by every request
///
/// Immutable once validated. `program_secret` is the AES key material; its
/// length is only checked when the first body is encrypted.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default = "default_api_domain")]
    pub api_domain: String,
    #[serde(default)]
    pub program_id: String,
    #[serde(default)]
    pub program_secret: String,
    #[serde(default)]
    pub merchant_public_key: String,
    #[serde(default)]
    pub sign_type: SignType,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_domain: DEFAULT_API_DOMAIN.to_string(),
            program_id: String::new(),
            program_secret: String::new(),
            merchant_public_key: String::new(),
            sign_type: SignType::Rsa,
        }
    }
}

impl ServiceConfig {
    pub fn new(
        api_domain: &str,
        program_id: &str,
        program_secret: &str,
        merchant_public_key: &str,
        sign_type: &str,
    ) -> Self {
        let api_domain = if api_domain.trim().is_empty() {
            DEFAULT_API_DOMAIN.to_string()
        } else {
            api_domain.trim().to_string()
        };

        Self {
            api_domain,
            program_id: program_id.to_string(),
            program_secret: program_secret.to_string(),
            merchant_public_key: merchant_public_key.to_string(),
            sign_type: SignType::parse_lenient(sign_type),
        }
    }

    /// Check the required fields in order: programId, programSecret, merchantPublicKey
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program_id.is_empty() {
            return Err(ConfigError::MissingField("programId"));
        }
        if self.program_secret.is_empty() {
            return Err(ConfigError::MissingField("programSecret"));
        }
        if self.merchant_public_key.is_empty() {
            return Err(ConfigError::MissingField("merchantPublicKey"));
        }
        Ok(())
    }

    /// Full URL for an API path
    pub fn full_url(&self, path: &str) -> String {
        format!("{}{}", self.api_domain.trim_end_matches('/'), path)
    }
}

// Secrets stay out of logs
impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_domain", &self.api_domain)
            .field("program_id", &self.program_id)
            .field("program_secret", &"<redacted>")
            .field(
                "merchant_public_key",
                &format!("<{} chars>", self.merchant_public_key.len()),
            )
            .field("sign_type", &self.sign_type)
            .finish()
    }
}
