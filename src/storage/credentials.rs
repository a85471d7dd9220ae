// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::kv::{KeyValueStore, MemoryStore, StorageError};
use super::secure::{MemorySecureStore, SecureStore};

pub const DEVICE_ID_KEY: &str = "device_id";
pub const TOKEN_KEY: &str = "token";
pub const PASSWORD_KEY: &str = "ka_pwd";
pub const PONG_INTERVAL_KEY: &str = "pong_interval";

/// Keys blanked by [`CredentialStore::clear_all`]
const SESSION_KEYS: [&str; 2] = [TOKEN_KEY, PASSWORD_KEY];

/// Per-install credentials: device id, access token and auxiliary values
///
/// Cheap to clone; clones share the same backing stores. Persistence
/// failures are logged and otherwise ignored so that a broken disk never
/// blocks a request.
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
    secure: Arc<dyn SecureStore>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, secure: Arc<dyn SecureStore>) -> Self {
        Self { kv, secure }
    }

    /// In-memory stores namespaced for `program_id`
    pub fn in_memory(program_id: &str) -> Self {
        Self::new(
            Arc::new(MemoryStore::new(format!("{}_", program_id))),
            Arc::new(MemorySecureStore::new(program_id)),
        )
    }

    /// Device id, generated and persisted on first use
    ///
    /// 32 lowercase hex characters. Never regenerated while the stored value
    /// is non-empty.
    pub fn device_id(&self) -> String {
        if let Some(id) = self.kv.read(DEVICE_ID_KEY).filter(|id| !id.is_empty()) {
            return id;
        }

        let id = Uuid::new_v4().simple().to_string();
        self.log_failure("save device id", self.kv.save(DEVICE_ID_KEY, &id));
        info!("Generated new device id");
        id
    }

    /// Access token; an empty stored value counts as absent
    pub fn token(&self) -> Option<String> {
        self.kv.read(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn put_token(&self, token: &str) {
        self.log_failure("save token", self.kv.save(TOKEN_KEY, token));
    }

    /// Heartbeat interval hint returned by login, verbatim
    pub fn pong_interval_hint(&self) -> Option<String> {
        self.kv.read(PONG_INTERVAL_KEY).filter(|v| !v.is_empty())
    }

    pub fn put_pong_interval_hint(&self, hint: &str) {
        self.log_failure("save pong interval", self.kv.save(PONG_INTERVAL_KEY, hint));
    }

    pub fn get_val(&self, key: &str) -> Option<String> {
        self.kv.read(key)
    }

    pub fn put_val(&self, key: &str, value: &str) {
        self.log_failure("save value", self.kv.save(key, value));
    }

    /// Secret values (saved passwords) go to the secure store
    pub fn secure(&self) -> &dyn SecureStore {
        self.secure.as_ref()
    }

    /// Wipe the session: blank token and saved password, empty the secure store
    ///
    /// The device id survives.
    pub fn clear_all(&self) {
        for key in SESSION_KEYS {
            self.log_failure("blank session key", self.kv.save(key, ""));
        }
        if !self.secure.clear() {
            warn!("Secure store refused to clear");
        }
        info!("Cleared all stored credentials");
    }

    fn log_failure(&self, action: &str, result: Result<(), StorageError>) {
        match result {
            Ok(()) => debug!("Credential store: {}", action),
            Err(e) => warn!("Credential store failed to {}: {}", action, e),
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}
