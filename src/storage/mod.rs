// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod credentials;
pub mod kv;
pub mod secure;

pub use credentials::{
    CredentialStore, DEVICE_ID_KEY, PASSWORD_KEY, PONG_INTERVAL_KEY, TOKEN_KEY,
};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use secure::{MemorySecureStore, SecureStore};
