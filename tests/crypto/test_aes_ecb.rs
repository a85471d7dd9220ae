// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! AES-ECB with zero padding

use kauth_client::crypto::{aes_decrypt, aes_decrypt_base64, aes_encrypt, aes_encrypt_base64};
use kauth_client::CryptoError;
use rand::{rngs::OsRng, Rng, RngCore};

#[test]
fn test_round_trip_for_all_key_sizes() {
    for key_len in [16usize, 24, 32] {
        let mut key = vec![0u8; key_len];
        OsRng.fill_bytes(&mut key);

        for len in [1usize, 15, 16, 17, 31, 32, 100] {
            let mut plaintext = vec![0u8; len];
            OsRng.fill_bytes(&mut plaintext);
            // Keep the last byte non-zero so the round trip is exact
            plaintext[len - 1] = OsRng.gen_range(1..=255);

            let ciphertext = aes_encrypt(&plaintext, &key).unwrap();
            assert_eq!(ciphertext.len() % 16, 0);
            assert_eq!(aes_decrypt(&ciphertext, &key).unwrap(), plaintext);
        }
    }
}

#[test]
fn test_block_aligned_input_gets_full_padding_block() {
    let key = [7u8; 16];
    let ciphertext = aes_encrypt(&[0x41; 16], &key).unwrap();
    assert_eq!(ciphertext.len(), 32);

    let ciphertext = aes_encrypt(&[], &key).unwrap();
    assert_eq!(ciphertext.len(), 16);
}

#[test]
fn test_trailing_zero_bytes_are_lost() {
    let key = [9u8; 32];
    let plaintext = b"data\x00\x00";
    let decrypted = aes_decrypt(&aes_encrypt(plaintext, &key).unwrap(), &key).unwrap();

    assert_ne!(decrypted, plaintext.to_vec());
    assert_eq!(decrypted, b"data".to_vec());
}

#[test]
fn test_rejects_invalid_key_lengths() {
    for len in [15usize, 17, 33] {
        let key = vec![1u8; len];
        assert!(matches!(
            aes_encrypt(b"x", &key),
            Err(CryptoError::InvalidKeyLength { actual, .. }) if actual == len
        ));
        assert!(matches!(
            aes_decrypt(&[0u8; 16], &key),
            Err(CryptoError::InvalidKeyLength { actual, .. }) if actual == len
        ));
    }
}

#[test]
fn test_base64_wrappers() {
    let ciphertext = aes_encrypt_base64(r#"{"a":1}"#, "0123456789abcdef").unwrap();
    assert_eq!(
        aes_decrypt_base64(&ciphertext, "0123456789abcdef").unwrap(),
        r#"{"a":1}"#
    );

    assert!(matches!(
        aes_decrypt_base64("***", "0123456789abcdef"),
        Err(CryptoError::InvalidEncoding { .. })
    ));
}
