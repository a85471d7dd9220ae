// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::crypto::CryptoError;

/// Failures of the request/response pipeline
///
/// Crypto and signature failures abort the single request that hit them and
/// are never retried inside the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KauthError {
    #[error("Invalid key length: expected {expected} bytes, got {actual} bytes")]
    InvalidKeyLength { expected: &'static str, actual: usize },

    #[error("Key parse error: {0}")]
    KeyParseError(String),

    #[error("Padding error: {0}")]
    PaddingError(String),

    #[error("Request body encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Response body decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Signature generation failed: {0}")]
    SignatureFailed(String),

    #[error("Server signature verification failed")]
    SignatureVerificationFailed,

    #[error("Response parse failed: {0}")]
    ResponseParseFailed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for header {0}")]
    InvalidHeaderValue(String),

    #[error("Missing response header: {0}")]
    MissingHeader(String),

    #[error("Response timestamp outside tolerance")]
    TimestampExpired,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl KauthError {
    /// Map a failure of the body-encryption stage
    pub fn encryption(err: CryptoError) -> Self {
        KauthError::EncryptionFailed(err.to_string())
    }

    /// Map a failure of the signing stage, key parsing included
    pub fn signing(err: CryptoError) -> Self {
        KauthError::SignatureFailed(err.to_string())
    }

    /// Map a failure of the response-decryption stage
    pub fn decryption(err: CryptoError) -> Self {
        KauthError::DecryptionFailed(err.to_string())
    }
}

impl From<CryptoError> for KauthError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidKeyLength { expected, actual } => {
                KauthError::InvalidKeyLength { expected, actual }
            }
            CryptoError::KeyParseError { .. } => KauthError::KeyParseError(err.to_string()),
            CryptoError::PaddingError { .. } => KauthError::PaddingError(err.to_string()),
            CryptoError::EncryptFailed { .. } => KauthError::EncryptionFailed(err.to_string()),
            CryptoError::DecryptFailed { .. } | CryptoError::InvalidEncoding { .. } => {
                KauthError::DecryptionFailed(err.to_string())
            }
        }
    }
}

impl From<url::ParseError> for KauthError {
    fn from(err: url::ParseError) -> Self {
        KauthError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for KauthError {
    fn from(err: reqwest::Error) -> Self {
        KauthError::Transport(err.to_string())
    }
}
