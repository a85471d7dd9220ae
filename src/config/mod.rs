// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration and settings loading

pub mod service;
pub mod settings;

pub use service::{ConfigError, ServiceConfig, SignType, DEFAULT_API_DOMAIN};
pub use settings::KauthSettings;
