// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request Signature Engine
//!
//! Every request carries a signature over a fixed canonical string:
//!
//! ```text
//! url:{path}
//! body:{body}
//! nonce:{nonce}
//! time:{time}
//! ```
//!
//! The string is MD5'd and the lowercase hex digest is then either
//! RSA-encrypted with the merchant public key or HMAC-SHA256'd with the
//! merchant key string as the HMAC key.
//!
//! The RSA variant is encryption-as-signature: anyone holding the merchant
//! public key can produce it. It keeps the digest confidential towards the
//! server but does not authenticate the client. The server depends on this
//! exact construction, so it is kept as-is.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{ServiceConfig, SignType};
use crate::crypto::{
    hmac_sha256_base64, hmac_sha256_verify_base64, md5_hex, parse_public_key,
    rsa_decrypt_with_public_key_raw, rsa_encrypt, CryptoError,
};

/// Build the newline-delimited string that gets digested
///
/// No trailing newline. `body` is the normalized plaintext body, never the
/// ciphertext.
pub fn build_canonical_string(path: &str, body: &str, nonce: &str, time: i64) -> String {
    format!("url:{}\nbody:{}\nnonce:{}\ntime:{}", path, body, nonce, time)
}

/// Sign a request, returning the base64 signature for the `ka-sign` header
pub fn sign(
    config: &ServiceConfig,
    path: &str,
    body: &str,
    nonce: &str,
    time: i64,
) -> Result<String, CryptoError> {
    let digest = md5_hex(&build_canonical_string(path, body, nonce, time));
    debug!("Signing {} (nonce {}, digest {})", path, nonce, digest);

    match config.sign_type {
        SignType::Rsa => {
            let public_key = parse_public_key(&config.merchant_public_key)?;
            let encrypted = rsa_encrypt(digest.as_bytes(), &public_key)?;
            Ok(STANDARD.encode(encrypted))
        }
        SignType::HmacSha256 => {
            hmac_sha256_base64(config.merchant_public_key.as_bytes(), digest.as_bytes())
        }
    }
}

/// Check a server-issued response signature
///
/// RSA: the signature is run through the raw public-key operation and the
/// recovered digest is compared with a fresh MD5 of the canonical string.
/// HMAC: decoded tag bytes are compared. Every failure (bad base64, bad key,
/// no digest recovered) reads as `false`.
pub fn verify_response_signature(
    config: &ServiceConfig,
    path: &str,
    body: Option<&str>,
    nonce: &str,
    time: i64,
    signature: &str,
) -> bool {
    let digest = md5_hex(&build_canonical_string(
        path,
        body.unwrap_or_default(),
        nonce,
        time,
    ));

    match config.sign_type {
        SignType::Rsa => {
            let recovered = STANDARD
                .decode(signature.trim())
                .map_err(CryptoError::from)
                .and_then(|raw| {
                    let public_key = parse_public_key(&config.merchant_public_key)?;
                    rsa_decrypt_with_public_key_raw(&raw, &public_key)
                });

            match recovered {
                Ok(recovered) => {
                    let valid = recovered == digest;
                    debug!("Response signature for {}: valid={}", path, valid);
                    valid
                }
                Err(e) => {
                    warn!("Could not recover response signature digest: {}", e);
                    false
                }
            }
        }
        SignType::HmacSha256 => hmac_sha256_verify_base64(
            config.merchant_public_key.as_bytes(),
            digest.as_bytes(),
            signature,
        ),
    }
}

/// Headers-to-be for one outbound request
///
/// Built once per call and consumed when the headers are attached, so a
/// nonce can never be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEnvelope {
    pub nonce: String,
    pub time: i64,
    pub sign: String,
    pub sign_type: SignType,
    pub program_id: String,
    pub access_token: Option<String>,
}

impl SignatureEnvelope {
    /// Fresh nonce and timestamp, then sign
    pub fn build(
        config: &ServiceConfig,
        device_id: &str,
        access_token: Option<String>,
        path: &str,
        body: &str,
    ) -> Result<Self, CryptoError> {
        let nonce = new_nonce(device_id);
        let time = Utc::now().timestamp_millis();
        Self::build_at(config, nonce, time, access_token, path, body)
    }

    /// Sign with a caller-chosen nonce and time
    pub fn build_at(
        config: &ServiceConfig,
        nonce: String,
        time: i64,
        access_token: Option<String>,
        path: &str,
        body: &str,
    ) -> Result<Self, CryptoError> {
        let sign = sign(config, path, body, &nonce, time)?;
        Ok(Self {
            nonce,
            time,
            sign,
            sign_type: config.sign_type,
            program_id: config.program_id.clone(),
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }
}

/// `{device_id}_{32 hex chars}`
pub fn new_nonce(device_id: &str) -> String {
    format!("{}_{}", device_id, Uuid::new_v4().simple())
}
