// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inbound response verification

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use kauth_client::crypto::{aes_encrypt_base64, md5_hex, parse_private_key, rsa_encrypt_with_private_key};
use kauth_client::interceptor::headers;
use kauth_client::{
    build_canonical_string, configure, HttpRequest, HttpResponse, InterceptorOptions, KauthError,
};
use reqwest::header::HeaderValue;
use serde_json::Value;
use url::Url;

use crate::support::{rsa_pem_pair, PROGRAM_SECRET};

const PATH: &str = "/api/consumer/user/info";

fn request() -> HttpRequest {
    HttpRequest::post(Url::parse(&format!("https://api.kauth.cn{}", PATH)).unwrap())
}

#[test]
fn test_non_success_envelope_returned_unchanged() {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "RSA").unwrap();
    let raw = br#"{"code":403,"isSuccess":false,"msg":"forbidden","data":"not even base64!"}"#;

    let out = context
        .interceptor(InterceptorOptions::default())
        .verify(&HttpResponse::new(403, raw.to_vec()), &request())
        .unwrap();
    assert_eq!(out, raw.to_vec());
}

#[test]
fn test_success_envelope_is_rebuilt_with_nested_data() {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "RSA").unwrap();
    let data = aes_encrypt_base64(r#"{"nickname":"bob","balance":1.5}"#, PROGRAM_SECRET).unwrap();
    let raw = format!(
        r#"{{"msg":"success","data":"{}","code":200,"traceId":"abc","elapse":"3","respTime":"2025-01-01 00:00:00","isSuccess":true}}"#,
        data
    );

    let out = context
        .interceptor(InterceptorOptions::default())
        .verify(&HttpResponse::new(200, raw), &request())
        .unwrap();
    let value: Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(value["msg"], "success");
    assert_eq!(value["code"], 200);
    assert_eq!(value["traceId"], "abc");
    assert_eq!(value["elapse"], "3");
    assert_eq!(value["success"], true);
    assert_eq!(value["data"]["nickname"], "bob");
    assert!(value.get("isSuccess").is_none());
}

#[test]
fn test_non_object_plaintext_omits_data() {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "RSA").unwrap();
    let data = aes_encrypt_base64("pong", PROGRAM_SECRET).unwrap();
    let raw = format!(r#"{{"code":200,"data":"{}"}}"#, data);

    let out = context
        .interceptor(InterceptorOptions::default())
        .verify(&HttpResponse::new(200, raw), &request())
        .unwrap();
    let value: Value = serde_json::from_slice(&out).unwrap();
    assert!(value.get("data").is_none());
    assert_eq!(value["msg"], "");
}

#[test]
fn test_malformed_body_is_parse_failure() {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "RSA").unwrap();
    let result = context
        .interceptor(InterceptorOptions::default())
        .verify(&HttpResponse::new(502, "<html>bad gateway</html>"), &request());
    assert!(matches!(result, Err(KauthError::ResponseParseFailed(_))));
}

#[test]
fn test_partial_block_ciphertext_is_decryption_failure() {
    let context = configure("", "prog", PROGRAM_SECRET, "key", "RSA").unwrap();
    // 5 bytes: valid base64, not a whole AES block
    let raw = r#"{"code":200,"data":"AQIDBAU="}"#;

    let result = context
        .interceptor(InterceptorOptions::default())
        .verify(&HttpResponse::new(200, raw), &request());
    assert!(matches!(result, Err(KauthError::DecryptionFailed(_))));
}

fn signed_response(body_plain: &str, time: i64, tamper: bool) -> HttpResponse {
    let private_key = parse_private_key(&rsa_pem_pair().0).unwrap();
    let nonce = "server_nonce";
    let signed_body = if tamper { "{}" } else { body_plain };
    let digest = md5_hex(&build_canonical_string(PATH, signed_body, nonce, time));
    let sign = STANDARD.encode(rsa_encrypt_with_private_key(digest.as_bytes(), &private_key).unwrap());

    let data = aes_encrypt_base64(body_plain, PROGRAM_SECRET).unwrap();
    let mut response = HttpResponse::new(200, format!(r#"{{"code":200,"data":"{}"}}"#, data));
    response.headers.insert(headers::NONCE, HeaderValue::from_static("server_nonce"));
    response
        .headers
        .insert(headers::TIME, HeaderValue::from_str(&time.to_string()).unwrap());
    response.headers.insert(headers::SIGN, HeaderValue::from_str(&sign).unwrap());
    response.headers.insert(headers::SIGN_TYPE, HeaderValue::from_static("RSA"));
    response
}

fn enforcing() -> InterceptorOptions {
    InterceptorOptions {
        verify_response_signature: true,
        ..Default::default()
    }
}

#[test]
fn test_enforced_signature_accepts_valid_response() {
    let context = configure("", "prog", PROGRAM_SECRET, &rsa_pem_pair().1, "RSA").unwrap();
    let response = signed_response(r#"{"ok":true}"#, Utc::now().timestamp_millis(), false);

    let out = context.interceptor(enforcing()).verify(&response, &request()).unwrap();
    let value: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["data"]["ok"], true);
}

#[test]
fn test_enforced_signature_rejects_tampered_body() {
    let context = configure("", "prog", PROGRAM_SECRET, &rsa_pem_pair().1, "RSA").unwrap();
    let response = signed_response(r#"{"ok":true}"#, Utc::now().timestamp_millis(), true);

    assert_eq!(
        context.interceptor(enforcing()).verify(&response, &request()),
        Err(KauthError::SignatureVerificationFailed)
    );

    // Not enforced: the same response passes
    assert!(context
        .interceptor(InterceptorOptions::default())
        .verify(&response, &request())
        .is_ok());
}

#[test]
fn test_enforced_signature_rejects_stale_timestamp() {
    let context = configure("", "prog", PROGRAM_SECRET, &rsa_pem_pair().1, "RSA").unwrap();
    let stale = Utc::now().timestamp_millis() - 121_000;
    let response = signed_response(r#"{"ok":true}"#, stale, false);

    assert_eq!(
        context.interceptor(enforcing()).verify(&response, &request()),
        Err(KauthError::TimestampExpired)
    );
}
