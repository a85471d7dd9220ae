// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::service::{ConfigError, ServiceConfig, SignType};
use crate::interceptor::InterceptorOptions;
use crate::session::LivenessConfig;

/// Everything the client reads at startup
///
/// ```toml
/// [service]
/// apiDomain = "https://api.kauth.cn"
/// programId = "..."
/// programSecret = "..."
/// merchantPublicKey = "..."
/// signType = "RSA"
///
/// [liveness]
/// intervalSecs = 120
/// maxFailureCount = 3
///
/// [interceptor]
/// verifyResponseSignature = false
/// timestampToleranceMs = 120000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KauthSettings {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub liveness: LivenessConfig,
    #[serde(default)]
    pub interceptor: InterceptorOptions,
}

impl KauthSettings {
    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let settings: KauthSettings = toml::from_str(&content)?;
        debug!("Loaded settings from {}: {:?}", path.display(), settings.service);
        Ok(settings)
    }

    /// Load from environment variables, keeping defaults for anything unset
    ///
    /// `KAUTH_MERCHANT_PUBLIC_KEY_FILE` takes precedence over
    /// `KAUTH_MERCHANT_PUBLIC_KEY` when both are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        settings.apply_env()?;
        Ok(settings)
    }

    /// Overlay environment variables onto already loaded settings
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        let service = &mut self.service;

        if let Ok(val) = std::env::var("KAUTH_API_DOMAIN") {
            if !val.trim().is_empty() {
                service.api_domain = val.trim().to_string();
            }
        }
        if let Ok(val) = std::env::var("KAUTH_PROGRAM_ID") {
            service.program_id = val;
        }
        if let Ok(val) = std::env::var("KAUTH_PROGRAM_SECRET") {
            service.program_secret = val;
        }
        if let Ok(val) = std::env::var("KAUTH_MERCHANT_PUBLIC_KEY") {
            service.merchant_public_key = val;
        }
        if let Ok(path) = std::env::var("KAUTH_MERCHANT_PUBLIC_KEY_FILE") {
            service.merchant_public_key =
                std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
        }
        if let Ok(val) = std::env::var("KAUTH_SIGN_TYPE") {
            service.sign_type = SignType::parse_lenient(&val);
        }

        if let Ok(val) = std::env::var("KAUTH_HEARTBEAT_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                self.liveness.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("KAUTH_VERIFY_RESPONSE_SIGNATURE") {
            self.interceptor.verify_response_signature =
                matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(())
    }
}
