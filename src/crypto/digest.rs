// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! MD5 and HMAC-SHA256 helpers used by the signature engine

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

use super::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// MD5 of a UTF-8 string as 32 lowercase hex characters
pub fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Raw HMAC-SHA256 tag
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CryptoError::key_parse("hmac_key", e))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC-SHA256 tag, base64 encoded for transport
pub fn hmac_sha256_base64(key: &[u8], message: &[u8]) -> Result<String, CryptoError> {
    Ok(STANDARD.encode(hmac_sha256(key, message)?))
}

/// Check a base64 HMAC-SHA256 tag by comparing decoded bytes
///
/// Returns `false` for a tag that is not valid base64.
pub fn hmac_sha256_verify_base64(key: &[u8], message: &[u8], tag_b64: &str) -> bool {
    let Ok(tag) = STANDARD.decode(tag_b64.trim()) else {
        return false;
    };
    matches!(hmac_sha256(key, message), Ok(expected) if expected == tag)
}
