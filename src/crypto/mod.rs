// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Envelope Cryptography Module
//!
//! This module implements the cipher and digest primitives that wrap every
//! KAuth API call:
//!
//! - **AES-ECB**: Zero-padded block encryption of request and response bodies
//! - **RSA**: PKCS#1 v1.5 encryption chunked across `k - 11` byte boundaries
//! - **Digest Recovery**: Ordered strategies for reading a digest out of a raw
//!   public-key RSA block
//! - **Digests**: MD5 of the canonical string, HMAC-SHA256 signatures
//! - **Keys**: PEM / DER loading of merchant RSA keys
//!
//! ## Security Considerations
//!
//! - ECB leaks equal-block patterns and zero padding is lossy; both are fixed
//!   by the server protocol
//! - The "RSA signature" is the digest encrypted to the merchant public key.
//!   Anyone holding that public key can produce one. It hides the digest from
//!   observers but does not authenticate the client
//! - All failures are `CryptoError` data errors; nothing here panics on input
//!
//! ## Protocol Flow
//!
//! 1. Client normalizes the JSON body and encrypts it with the program secret
//! 2. Client MD5s the canonical string and signs the digest (RSA or HMAC)
//! 3. Server decrypts, re-derives the digest and compares
//! 4. Server encrypts the response `data` with the same program secret

pub mod aes_ecb;
pub mod digest;
pub mod digest_recovery;
pub mod error;
pub mod keys;
pub mod rsa_chunked;

pub use aes_ecb::{aes_decrypt, aes_decrypt_base64, aes_encrypt, aes_encrypt_base64};
pub use digest::{hmac_sha256, hmac_sha256_base64, hmac_sha256_verify_base64, md5_hex};
pub use digest_recovery::recover_digest;
pub use error::CryptoError;
pub use keys::{parse_private_key, parse_public_key};
pub use rsa_chunked::{
    rsa_decrypt_with_private_key, rsa_decrypt_with_public_key_raw, rsa_encrypt,
    rsa_encrypt_with_private_key,
};
