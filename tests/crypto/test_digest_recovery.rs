// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Digest recovery from server-minted signature blocks

use kauth_client::crypto::{
    md5_hex, parse_private_key, parse_public_key, rsa_decrypt_with_public_key_raw,
    rsa_encrypt_with_private_key,
};

use crate::support::rsa_pem_pair;

#[test]
fn test_recovers_hex_digest_from_private_key_block() {
    let (private_pem, public_pem) = rsa_pem_pair();
    let private_key = parse_private_key(private_pem).unwrap();
    let public_key = parse_public_key(public_pem).unwrap();

    let digest = md5_hex("url:/p\nbody:{}\nnonce:n\ntime:1");
    let block = rsa_encrypt_with_private_key(digest.as_bytes(), &private_key).unwrap();

    assert_eq!(
        rsa_decrypt_with_public_key_raw(&block, &public_key).unwrap(),
        digest
    );
}

#[test]
fn test_recovers_raw_digest_bytes_as_hex() {
    let (private_pem, public_pem) = rsa_pem_pair();
    let private_key = parse_private_key(private_pem).unwrap();
    let public_key = parse_public_key(public_pem).unwrap();

    let raw_digest: Vec<u8> = (0u8..16).collect();
    let block = rsa_encrypt_with_private_key(&raw_digest, &private_key).unwrap();

    assert_eq!(
        rsa_decrypt_with_public_key_raw(&block, &public_key).unwrap(),
        hex::encode(&raw_digest)
    );
}

#[test]
fn test_wrong_length_block_is_an_error() {
    let public_key = parse_public_key(&rsa_pem_pair().1).unwrap();
    assert!(rsa_decrypt_with_public_key_raw(&[1u8; 10], &public_key).is_err());
}
