// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Error type shared by every cipher and digest primitive in this crate.
//!
//! ## Error Variants
//!
//! - **InvalidKeyLength**: AES key is not 16, 24 or 32 bytes
//! - **KeyParseError**: RSA key material could not be decoded (PEM armor, base64, DER)
//! - **PaddingError**: Block padding could not be applied or removed
//! - **EncryptFailed**: A cipher operation failed while encrypting
//! - **DecryptFailed**: A cipher operation failed while decrypting
//! - **InvalidEncoding**: Transport encoding (base64, UTF-8) of an input was malformed
//!
//! All of these are data errors. Callers treat every variant as recoverable and
//! abort only the request that produced it.

use std::fmt;

/// Error type for all cryptographic operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// AES key length is not one of 16/24/32 bytes
    InvalidKeyLength {
        /// Accepted lengths, for the message
        expected: &'static str,
        /// Length that was supplied
        actual: usize,
    },

    /// RSA key could not be parsed
    KeyParseError {
        /// Which key failed (e.g. "merchant_public_key")
        key_type: String,
        /// Specific failure reason
        reason: String,
    },

    /// Padding could not be applied or stripped
    PaddingError {
        operation: String,
        reason: String,
    },

    /// Encryption failed
    EncryptFailed {
        operation: String,
        reason: String,
    },

    /// Decryption failed
    ///
    /// This error occurs when:
    /// - Ciphertext is not a whole number of blocks
    /// - PKCS#1 unpadding rejects a block (wrong key or corrupted data)
    /// - Decrypted bytes are not valid UTF-8 where text was expected
    DecryptFailed {
        operation: String,
        reason: String,
    },

    /// Input encoding was malformed
    InvalidEncoding {
        /// Which input failed to decode
        field: String,
        reason: String,
    },
}

impl CryptoError {
    pub(crate) fn encrypt(operation: &str, reason: impl fmt::Display) -> Self {
        CryptoError::EncryptFailed {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decrypt(operation: &str, reason: impl fmt::Display) -> Self {
        CryptoError::DecryptFailed {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn key_parse(key_type: &str, reason: impl fmt::Display) -> Self {
        CryptoError::KeyParseError {
            key_type: key_type.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidKeyLength { expected, actual } => {
                write!(
                    f,
                    "Invalid key length: expected {} bytes, got {} bytes",
                    expected, actual
                )
            }
            CryptoError::KeyParseError { key_type, reason } => {
                write!(f, "Failed to parse key ({}): {}", key_type, reason)
            }
            CryptoError::PaddingError { operation, reason } => {
                write!(f, "Padding error during {}: {}", operation, reason)
            }
            CryptoError::EncryptFailed { operation, reason } => {
                write!(f, "Encryption failed during {}: {}", operation, reason)
            }
            CryptoError::DecryptFailed { operation, reason } => {
                write!(f, "Decryption failed during {}: {}", operation, reason)
            }
            CryptoError::InvalidEncoding { field, reason } => {
                write!(f, "Invalid encoding for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for CryptoError {}

// Conversion from base64 decode errors
impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        CryptoError::InvalidEncoding {
            field: "base64".to_string(),
            reason: format!("base64 decode error: {}", err),
        }
    }
}
