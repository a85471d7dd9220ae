// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chunked RSA PKCS#1 v1.5
//!
//! RSA can only encrypt a message shorter than the modulus. PKCS#1 v1.5 costs
//! 11 bytes of padding per block, so input is split into chunks of at most
//! `k - 11` bytes (`k` = modulus length in bytes), each chunk is encrypted on
//! its own and the `k`-byte outputs are concatenated:
//!
//! ```text
//! plaintext:  [ chunk 0 (<= k-11) | chunk 1 (<= k-11) | ... ]
//! ciphertext: [ block 0 (k)       | block 1 (k)       | ... ]
//! ```
//!
//! Decryption walks the ciphertext in `k`-byte blocks and concatenates the
//! unpadded plaintext chunks.
//!
//! `rsa_decrypt_with_public_key_raw` is not decryption in the usual sense. It
//! applies the public exponent to a block minted with the private key and
//! hands the raw result to [`digest_recovery`](super::digest_recovery).

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};

use super::digest_recovery::recover_digest;
use super::error::CryptoError;

/// Bytes of PKCS#1 v1.5 overhead per block
pub const PKCS1_OVERHEAD: usize = 11;

/// Largest plaintext chunk a single block can carry for this key
pub fn max_chunk_len(key: &RsaPublicKey) -> usize {
    key.size() - PKCS1_OVERHEAD
}

/// Number of blocks a plaintext of `plaintext_len` bytes encrypts into
pub fn chunk_count(plaintext_len: usize, key: &RsaPublicKey) -> usize {
    let chunk = max_chunk_len(key);
    (plaintext_len + chunk - 1) / chunk
}

/// Encrypt with the public key, chunking at `k - 11` bytes
///
/// # Returns
///
/// `chunk_count(len) * k` bytes of ciphertext. Empty input yields empty output.
///
/// # Errors
///
/// Returns `CryptoError::EncryptFailed` if any chunk fails to encrypt.
pub fn rsa_encrypt(plaintext: &[u8], public_key: &RsaPublicKey) -> Result<Vec<u8>, CryptoError> {
    let chunk_len = max_chunk_len(public_key);
    let mut output = Vec::with_capacity(chunk_count(plaintext.len(), public_key) * public_key.size());
    let mut rng = OsRng;

    for chunk in plaintext.chunks(chunk_len) {
        let block = public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, chunk)
            .map_err(|e| CryptoError::encrypt("rsa_public_encrypt", e))?;
        output.extend_from_slice(&block);
    }

    Ok(output)
}

/// Decrypt with the private key, one `k`-byte block at a time
///
/// # Errors
///
/// - `CryptoError::DecryptFailed` when the ciphertext is not a whole number of
///   blocks or a block fails PKCS#1 unpadding
pub fn rsa_decrypt_with_private_key(
    ciphertext: &[u8],
    private_key: &RsaPrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    let block_len = private_key.size();
    if ciphertext.len() % block_len != 0 {
        return Err(CryptoError::decrypt(
            "rsa_private_decrypt",
            format!(
                "ciphertext length {} is not a multiple of block size {}",
                ciphertext.len(),
                block_len
            ),
        ));
    }

    let mut output = Vec::with_capacity(ciphertext.len());
    for (index, block) in ciphertext.chunks(block_len).enumerate() {
        let chunk = private_key
            .decrypt(Pkcs1v15Encrypt, block)
            .map_err(|e| CryptoError::decrypt("rsa_private_decrypt", format!("block {}: {}", index, e)))?;
        output.extend_from_slice(&chunk);
    }

    Ok(output)
}

/// "Encrypt" with the private key (PKCS#1 v1.5 block type 1), chunked
///
/// This is the server side of the digest-in-RSA signature: each chunk is
/// padded `00 01 FF..FF 00 || chunk` and raised to the private exponent.
pub fn rsa_encrypt_with_private_key(
    plaintext: &[u8],
    private_key: &RsaPrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    let chunk_len = private_key.size() - PKCS1_OVERHEAD;
    let mut output = Vec::new();

    for chunk in plaintext.chunks(chunk_len) {
        let block = private_key
            .sign(Pkcs1v15Sign::new_unprefixed(), chunk)
            .map_err(|e| CryptoError::encrypt("rsa_private_encrypt", e))?;
        output.extend_from_slice(&block);
    }

    Ok(output)
}

/// Apply the public exponent to one block without any unpadding
///
/// The result is left-padded to the modulus length, so a PKCS#1 block keeps
/// its leading `0x00`.
pub fn rsa_public_raw(block: &[u8], public_key: &RsaPublicKey) -> Result<Vec<u8>, CryptoError> {
    let k = public_key.size();
    if block.len() != k {
        return Err(CryptoError::decrypt(
            "rsa_public_raw",
            format!("expected a single {}-byte block, got {} bytes", k, block.len()),
        ));
    }

    let c = BigUint::from_bytes_be(block);
    if &c >= public_key.n() {
        return Err(CryptoError::decrypt(
            "rsa_public_raw",
            "ciphertext representative out of range",
        ));
    }

    let m = c.modpow(public_key.e(), public_key.n()).to_bytes_be();
    let mut raw = vec![0u8; k - m.len()];
    raw.extend_from_slice(&m);
    Ok(raw)
}

/// Recover an MD5 digest string from a server-issued "signature" block
///
/// Best effort. The raw block is handed to the ordered digest-recovery
/// strategies and the first plausible digest wins; if none match, the hex of
/// the whole raw block is returned so that comparison simply fails.
pub fn rsa_decrypt_with_public_key_raw(
    ciphertext: &[u8],
    public_key: &RsaPublicKey,
) -> Result<String, CryptoError> {
    let raw = rsa_public_raw(ciphertext, public_key)?;
    Ok(recover_digest(&raw))
}
