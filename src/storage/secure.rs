// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::collections::HashMap;
use std::sync::RwLock;

/// Secret-holding store (platform keychain or equivalent)
///
/// Mirrors the keychain API: writes report success as a bool and never fail
/// loudly.
pub trait SecureStore: Send + Sync {
    fn save(&self, key: &str, value: &str) -> bool;
    fn read(&self, key: &str) -> Option<String>;
    fn delete(&self, key: &str) -> bool;
    /// Remove every item owned by this store's service
    fn clear(&self) -> bool;
}

/// In-memory secure store keyed by `(service, key)`
#[derive(Debug, Default)]
pub struct MemorySecureStore {
    service: String,
    items: RwLock<HashMap<(String, String), String>>,
}

impl MemorySecureStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            items: RwLock::new(HashMap::new()),
        }
    }

    fn item_key(&self, key: &str) -> (String, String) {
        (self.service.clone(), key.to_string())
    }
}

impl SecureStore for MemorySecureStore {
    fn save(&self, key: &str, value: &str) -> bool {
        match self.items.write() {
            Ok(mut items) => {
                items.insert(self.item_key(key), value.to_string());
                true
            }
            Err(_) => false,
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        self.items.read().ok()?.get(&self.item_key(key)).cloned()
    }

    fn delete(&self, key: &str) -> bool {
        match self.items.write() {
            Ok(mut items) => items.remove(&self.item_key(key)).is_some(),
            Err(_) => false,
        }
    }

    fn clear(&self) -> bool {
        match self.items.write() {
            Ok(mut items) => {
                items.retain(|(service, _), _| service != &self.service);
                true
            }
            Err(_) => false,
        }
    }
}
