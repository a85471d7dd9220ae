// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use kauth_client::signature::{build_canonical_string, sign};
use kauth_client::ServiceConfig;

#[test]
fn test_canonical_string_exact_layout() {
    assert_eq!(
        build_canonical_string("/api/x", "{}", "dev_abc", 1700000000000),
        "url:/api/x\nbody:{}\nnonce:dev_abc\ntime:1700000000000"
    );
}

#[test]
fn test_canonical_string_has_no_trailing_newline() {
    let canonical = build_canonical_string("/p", "", "n", 0);
    assert!(!canonical.ends_with('\n'));
    assert_eq!(canonical.lines().count(), 4);
}

#[test]
fn test_hmac_signature_depends_on_every_field() {
    let config = ServiceConfig::new("", "prog", "0123456789abcdef", "merchant-key", "HMAC_SHA256");
    let base = sign(&config, "/p", "{}", "n", 1).unwrap();

    assert_ne!(base, sign(&config, "/q", "{}", "n", 1).unwrap());
    assert_ne!(base, sign(&config, "/p", "{ }", "n", 1).unwrap());
    assert_ne!(base, sign(&config, "/p", "{}", "m", 1).unwrap());
    assert_ne!(base, sign(&config, "/p", "{}", "n", 2).unwrap());
}
