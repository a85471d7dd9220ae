// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP transport seam and the API client built on it

pub mod client;
pub mod endpoint;
pub mod reqwest_transport;

pub use client::ApiClient;
pub use endpoint::Endpoint;
pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;

use crate::interceptor::{HttpRequest, HttpResponse, KauthError};

/// Sends one already-signed request
///
/// Non-2xx statuses are not errors here; the envelope decides success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, KauthError>;
}
