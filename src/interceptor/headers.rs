// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

use super::error::KauthError;
use crate::signature::SignatureEnvelope;

pub const PROGRAM_ID: &str = "Program-Id";
pub const NONCE: &str = "ka-nonce";
pub const TIME: &str = "ka-time";
pub const SIGN_TYPE: &str = "ka-sign-type";
pub const SIGN: &str = "ka-sign";
pub const ACCESS_TOKEN: &str = "accesstoken";

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

fn insert(headers: &mut HeaderMap, name: &str, value: &str) -> Result<(), KauthError> {
    let invalid = || KauthError::InvalidHeaderValue(name.to_string());
    // from_bytes lowercases, so `Program-Id` is stored as `program-id`
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
    let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
    headers.insert(header_name, value);
    Ok(())
}

/// Write the signature headers for one request, consuming the envelope
pub fn attach_signature(
    headers: &mut HeaderMap,
    envelope: SignatureEnvelope,
) -> Result<(), KauthError> {
    insert(headers, PROGRAM_ID, &envelope.program_id)?;
    insert(headers, NONCE, &envelope.nonce)?;
    insert(headers, TIME, &envelope.time.to_string())?;
    insert(headers, SIGN_TYPE, envelope.sign_type.as_str())?;
    insert(headers, SIGN, &envelope.sign)?;
    if let Some(token) = envelope.access_token.as_deref() {
        insert(headers, ACCESS_TOKEN, token)?;
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    Ok(())
}

/// Header value as a string; missing or non-ASCII values read as absent
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
