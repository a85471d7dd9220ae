// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the KAuth client

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-envelope-signing-2025-11-03";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-03";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "aes-ecb-zero-padding",
    "rsa-chunked-pkcs1",
    "rsa-digest-signature",
    "hmac-sha256-signature",
    "envelope-rebuild",
    "response-signature-verification",
    "liveness-monitor",
    "file-credential-store",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("KAuth Client {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info as JSON
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
