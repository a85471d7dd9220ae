// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Outbound request adaptation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use kauth_client::crypto::{aes_decrypt_base64, md5_hex, parse_private_key, rsa_decrypt_with_private_key};
use kauth_client::interceptor::headers::{self, header_str};
use kauth_client::{build_canonical_string, configure, HttpRequest, InterceptorOptions, KauthError};
use std::collections::HashSet;
use url::Url;

use crate::support::{rsa_pem_pair, PROGRAM_SECRET};

fn request(path: &str, body: Option<&str>) -> HttpRequest {
    let mut request = HttpRequest::post(Url::parse(&format!("https://api.kauth.cn{}", path)).unwrap());
    request.body = body.map(|b| b.as_bytes().to_vec());
    request
}

#[test]
fn test_rsa_signed_request_is_recoverable_by_server() {
    let (private_pem, public_pem) = rsa_pem_pair();
    let context = configure("", "prog-1", PROGRAM_SECRET, public_pem, "RSA").unwrap();
    let interceptor = context.interceptor(InterceptorOptions::default());

    let signed = interceptor
        .adapt(request("/api/consumer/user/pwdlogin", Some(r#"{"loginName": "alice"}"#)))
        .unwrap();

    // Body on the wire is the base64 text of the ciphertext
    let wire_body = String::from_utf8(signed.body.clone().unwrap()).unwrap();
    let plain_body = aes_decrypt_base64(&wire_body, PROGRAM_SECRET).unwrap();
    assert_eq!(plain_body, r#"{"loginName":"alice"}"#);

    let nonce = header_str(&signed.headers, headers::NONCE).unwrap();
    let time: i64 = header_str(&signed.headers, headers::TIME).unwrap().parse().unwrap();
    assert_eq!(header_str(&signed.headers, headers::PROGRAM_ID), Some("prog-1"));
    assert_eq!(header_str(&signed.headers, headers::SIGN_TYPE), Some("RSA"));
    assert_eq!(
        header_str(&signed.headers, "Content-Type"),
        Some("application/json; charset=utf-8")
    );
    assert!(signed.headers.get(headers::ACCESS_TOKEN).is_none());

    // Server side: private-key decrypt the signature and compare digests
    let private_key = parse_private_key(private_pem).unwrap();
    let sign = STANDARD
        .decode(header_str(&signed.headers, headers::SIGN).unwrap())
        .unwrap();
    let recovered = rsa_decrypt_with_private_key(&sign, &private_key).unwrap();
    let expected = md5_hex(&build_canonical_string(
        "/api/consumer/user/pwdlogin",
        &plain_body,
        nonce,
        time,
    ));
    assert_eq!(String::from_utf8(recovered).unwrap(), expected);
}

#[test]
fn test_missing_body_signs_empty_object() {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "HMAC_SHA256").unwrap();
    let signed = context
        .interceptor(InterceptorOptions::default())
        .adapt(request("/api/x", None))
        .unwrap();

    let wire_body = String::from_utf8(signed.body.unwrap()).unwrap();
    assert_eq!(aes_decrypt_base64(&wire_body, PROGRAM_SECRET).unwrap(), "{}");
}

#[test]
fn test_token_header_only_when_token_present() {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "HMAC_SHA256").unwrap();
    let interceptor = context.interceptor(InterceptorOptions::default());

    context.credentials().put_token("");
    let signed = interceptor.adapt(request("/api/x", None)).unwrap();
    assert!(signed.headers.get(headers::ACCESS_TOKEN).is_none());

    context.credentials().put_token("abc123");
    let signed = interceptor.adapt(request("/api/x", None)).unwrap();
    assert_eq!(header_str(&signed.headers, headers::ACCESS_TOKEN), Some("abc123"));
}

#[test]
fn test_every_request_gets_a_fresh_nonce() {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "HMAC_SHA256").unwrap();
    let interceptor = context.interceptor(InterceptorOptions::default());
    let device_id = context.credentials().device_id();

    let nonces: HashSet<String> = (0..20)
        .map(|_| {
            let signed = interceptor.adapt(request("/api/x", None)).unwrap();
            header_str(&signed.headers, headers::NONCE).unwrap().to_string()
        })
        .collect();

    assert_eq!(nonces.len(), 20);
    assert!(nonces.iter().all(|n| n.starts_with(&format!("{}_", device_id))));
}

#[test]
fn test_invalid_merchant_key_is_signature_failure() {
    let context = configure("", "prog", PROGRAM_SECRET, "definitely not a key", "RSA").unwrap();
    let result = context
        .interceptor(InterceptorOptions::default())
        .adapt(request("/api/x", None));
    match result {
        Err(KauthError::SignatureFailed(detail)) => assert!(detail.contains("Failed to parse key")),
        other => panic!("unexpected {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_secret_length_checked_at_encrypt_time() {
    // 10-byte secret configures fine
    let context = configure("", "prog", "0123456789", "key", "HMAC_SHA256").unwrap();
    let result = context
        .interceptor(InterceptorOptions::default())
        .adapt(request("/api/x", None));
    assert!(matches!(result, Err(KauthError::EncryptionFailed(_))));
}
