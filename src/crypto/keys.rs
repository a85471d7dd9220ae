// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RSA Key Loading
//!
//! Merchant keys arrive as configuration strings in several shapes:
//!
//! - PEM `-----BEGIN PUBLIC KEY-----` (X.509 SubjectPublicKeyInfo)
//! - PEM `-----BEGIN RSA PUBLIC KEY-----` (PKCS#1)
//! - Bare base64 DER of either form, possibly wrapped across lines
//!
//! Armor lines are dropped, whitespace is removed, and the remaining base64 is
//! decoded and tried as SPKI first, then PKCS#1. Private keys follow the same
//! path with PKCS#8 tried before PKCS#1.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

use super::error::CryptoError;

/// Strip PEM armor and whitespace, then base64-decode the body
fn der_from_pem(pem: &str, key_type: &str) -> Result<Vec<u8>, CryptoError> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .flat_map(|line| line.chars())
        .filter(|c| !c.is_whitespace())
        .collect();

    if body.is_empty() {
        return Err(CryptoError::key_parse(key_type, "key material is empty"));
    }

    STANDARD
        .decode(body.as_bytes())
        .map_err(|e| CryptoError::key_parse(key_type, format!("base64 decode error: {}", e)))
}

/// Parse an RSA public key from PEM or bare base64 DER
pub fn parse_public_key(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    let der = der_from_pem(pem, "public_key")?;

    RsaPublicKey::from_public_key_der(&der)
        .or_else(|spki_err| {
            RsaPublicKey::from_pkcs1_der(&der).map_err(|pkcs1_err| {
                CryptoError::key_parse(
                    "public_key",
                    format!("not SPKI ({}) nor PKCS#1 ({})", spki_err, pkcs1_err),
                )
            })
        })
}

/// Parse an RSA private key from PEM or bare base64 DER
pub fn parse_private_key(pem: &str) -> Result<RsaPrivateKey, CryptoError> {
    let der = der_from_pem(pem, "private_key")?;

    RsaPrivateKey::from_pkcs8_der(&der).or_else(|pkcs8_err| {
        RsaPrivateKey::from_pkcs1_der(&der).map_err(|pkcs1_err| {
            CryptoError::key_parse(
                "private_key",
                format!("not PKCS#8 ({}) nor PKCS#1 ({})", pkcs8_err, pkcs1_err),
            )
        })
    })
}
