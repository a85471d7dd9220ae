// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide client context
//!
//! Built once by [`configure`] and handed to everything that needs the
//! service configuration or the credential store. Nothing in it changes
//! after construction.

use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{ConfigError, ServiceConfig};
use crate::interceptor::{Interceptor, InterceptorOptions};
use crate::session::{LivenessConfig, LivenessMonitor, LivenessProbe};
use crate::storage::{CredentialStore, FileStore, MemorySecureStore, StorageError};
use crate::transport::{ApiClient, Transport};

#[derive(Clone, Debug)]
pub struct KauthContext {
    config: Arc<ServiceConfig>,
    credentials: CredentialStore,
}

/// Validate configuration and set up the credential store
///
/// Empty `api_domain` falls back to the default domain and `sign_type` is
/// parsed leniently. On failure nothing is created and the error's display
/// string is the caller-visible message, e.g.
/// `fail:programSecret must not be empty`.
pub fn configure(
    api_domain: &str,
    program_id: &str,
    program_secret: &str,
    merchant_public_key: &str,
    sign_type: &str,
) -> Result<KauthContext, ConfigError> {
    let config = ServiceConfig::new(
        api_domain,
        program_id,
        program_secret,
        merchant_public_key,
        sign_type,
    );
    KauthContext::from_config(config)
}

impl KauthContext {
    /// Validated config with in-memory credential storage
    pub fn from_config(config: ServiceConfig) -> Result<Self, ConfigError> {
        Self::validate(&config)?;
        let credentials = CredentialStore::in_memory(&config.program_id);
        Ok(Self::assemble(config, credentials))
    }

    /// Validated config with credentials persisted to a JSON file
    pub fn with_file_store(
        config: ServiceConfig,
        path: impl AsRef<Path>,
    ) -> Result<Self, StoreSetupError> {
        Self::validate(&config)?;
        let kv = FileStore::open(path, format!("{}_", config.program_id))?;
        let credentials = CredentialStore::new(
            Arc::new(kv),
            Arc::new(MemorySecureStore::new(config.program_id.clone())),
        );
        Ok(Self::assemble(config, credentials))
    }

    fn validate(config: &ServiceConfig) -> Result<(), ConfigError> {
        config.validate().map_err(|e| {
            error!("Configuration rejected: {}", e);
            e
        })
    }

    fn assemble(config: ServiceConfig, credentials: CredentialStore) -> Self {
        info!(
            "KAuth client configured for program {} at {} ({})",
            config.program_id, config.api_domain, config.sign_type
        );
        Self {
            config: Arc::new(config),
            credentials,
        }
    }

    pub fn config(&self) -> &Arc<ServiceConfig> {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn interceptor(&self, options: InterceptorOptions) -> Interceptor {
        Interceptor::with_options(self.config.clone(), self.credentials.clone(), options)
    }

    pub fn api_client(&self, transport: Arc<dyn Transport>, options: InterceptorOptions) -> ApiClient {
        ApiClient::new(self.config.clone(), self.interceptor(options), transport)
    }

    pub fn liveness_monitor(
        &self,
        probe: Arc<dyn LivenessProbe>,
        config: LivenessConfig,
    ) -> LivenessMonitor {
        LivenessMonitor::new(probe, self.credentials.clone(), config)
    }
}

/// Failure to build a file-backed context
#[derive(thiserror::Error, Debug)]
pub enum StoreSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
