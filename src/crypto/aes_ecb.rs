// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AES-ECB with Zero Padding for KAuth Envelopes
//!
//! Request bodies and response `data` fields are enciphered with the program
//! secret using AES in ECB mode. Each 16-byte block is enciphered on its own,
//! there is no IV and no chaining.
//!
//! **Padding** (zero padding, protocol-defined):
//! ```text
//! [plaintext | 0x00 * (16 - len % 16)]
//! ```
//!
//! - Always appends between 1 and 16 zero bytes; a plaintext that is already
//!   block-aligned gains a full block of zeros.
//! - Decryption strips every trailing `0x00`. A plaintext that itself ends in
//!   zero bytes loses them. This is lossy and kept for wire compatibility.
//!
//! Key size selects the variant: 16 bytes = AES-128, 24 = AES-192, 32 = AES-256.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::error::CryptoError;

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

const VALID_KEY_LENGTHS: &str = "16, 24 or 32";

enum EcbCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl EcbCipher {
    fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| CryptoError::InvalidKeyLength {
            expected: VALID_KEY_LENGTHS,
            actual: key.len(),
        };
        match key.len() {
            16 => Aes128::new_from_slice(key).map(EcbCipher::Aes128).map_err(invalid),
            24 => Aes192::new_from_slice(key).map(EcbCipher::Aes192).map_err(invalid),
            32 => Aes256::new_from_slice(key).map(EcbCipher::Aes256).map_err(invalid),
            actual => Err(CryptoError::InvalidKeyLength {
                expected: VALID_KEY_LENGTHS,
                actual,
            }),
        }
    }

    fn encrypt_blocks(&self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            match self {
                EcbCipher::Aes128(c) => c.encrypt_block(block),
                EcbCipher::Aes192(c) => c.encrypt_block(block),
                EcbCipher::Aes256(c) => c.encrypt_block(block),
            }
        }
    }

    fn decrypt_blocks(&self, data: &mut [u8]) {
        for chunk in data.chunks_exact_mut(AES_BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(chunk);
            match self {
                EcbCipher::Aes128(c) => c.decrypt_block(block),
                EcbCipher::Aes192(c) => c.decrypt_block(block),
                EcbCipher::Aes256(c) => c.decrypt_block(block),
            }
        }
    }
}

/// Encrypt with AES-ECB and zero padding
///
/// # Arguments
///
/// * `plaintext` - Bytes to encrypt (any length, including empty)
/// * `key` - 16, 24 or 32 byte key
///
/// # Returns
///
/// Raw ciphertext, always a non-zero multiple of 16 bytes
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyLength` for any other key size.
///
/// # Example
///
/// ```rust
/// use kauth_client::crypto::aes_ecb::{aes_encrypt, aes_decrypt};
///
/// let key = b"0123456789abcdef";
/// let ciphertext = aes_encrypt(b"{}", key).unwrap();
/// assert_eq!(ciphertext.len(), 16);
/// assert_eq!(aes_decrypt(&ciphertext, key).unwrap(), b"{}");
/// ```
pub fn aes_encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = EcbCipher::new(key)?;

    // 16 - (len % 16) is 16 when already aligned: a full zero block is added
    let padding_len = AES_BLOCK_SIZE - (plaintext.len() % AES_BLOCK_SIZE);
    let mut buffer = Vec::with_capacity(plaintext.len() + padding_len);
    buffer.extend_from_slice(plaintext);
    buffer.resize(plaintext.len() + padding_len, 0u8);

    cipher.encrypt_blocks(&mut buffer);
    Ok(buffer)
}

/// Decrypt AES-ECB ciphertext and strip zero padding
///
/// Every trailing `0x00` byte is removed after deciphering, whether it was
/// padding or part of the original plaintext.
///
/// # Errors
///
/// - `CryptoError::InvalidKeyLength` for a key that is not 16/24/32 bytes
/// - `CryptoError::DecryptFailed` when the ciphertext is not a whole number of blocks
pub fn aes_decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = EcbCipher::new(key)?;

    if ciphertext.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::decrypt(
            "aes_ecb",
            format!(
                "ciphertext length {} is not a multiple of {}",
                ciphertext.len(),
                AES_BLOCK_SIZE
            ),
        ));
    }

    let mut buffer = ciphertext.to_vec();
    cipher.decrypt_blocks(&mut buffer);

    let unpadded_len = buffer
        .iter()
        .rposition(|&b| b != 0)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    buffer.truncate(unpadded_len);

    Ok(buffer)
}

/// Encrypt a UTF-8 string and return the ciphertext as standard base64
///
/// The key is the UTF-8 bytes of `key`, which is how the program secret is
/// used on the wire.
pub fn aes_encrypt_base64(plaintext: &str, key: &str) -> Result<String, CryptoError> {
    let ciphertext = aes_encrypt(plaintext.as_bytes(), key.as_bytes())?;
    Ok(STANDARD.encode(ciphertext))
}

/// Decode base64 ciphertext, decrypt it, and return the plaintext as UTF-8
pub fn aes_decrypt_base64(ciphertext_b64: &str, key: &str) -> Result<String, CryptoError> {
    let ciphertext = STANDARD.decode(ciphertext_b64.trim())?;
    let plaintext = aes_decrypt(&ciphertext, key.as_bytes())?;
    String::from_utf8(plaintext)
        .map_err(|e| CryptoError::decrypt("aes_ecb", format!("plaintext is not valid UTF-8: {}", e)))
}
