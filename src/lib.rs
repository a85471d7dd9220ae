// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod config;
pub mod context;
pub mod crypto;
pub mod interceptor;
pub mod session;
pub mod signature;
pub mod storage;
pub mod transport;
pub mod version;

// Re-export the types most callers need
pub use config::{ConfigError, KauthSettings, ServiceConfig, SignType};
pub use context::{configure, KauthContext};
pub use crypto::CryptoError;
pub use interceptor::{
    ApiResult, HttpRequest, HttpResponse, Interceptor, InterceptorOptions, KauthError,
};
pub use session::{
    LivenessConfig, LivenessMonitor, LivenessProbe, ProbeOutcome, SessionEndReason, SessionEnded,
};
pub use signature::{build_canonical_string, SignatureEnvelope};
pub use storage::CredentialStore;
pub use transport::{ApiClient, Endpoint, ReqwestTransport, Transport};
