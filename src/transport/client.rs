// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::endpoint::Endpoint;
use super::Transport;
use crate::config::ServiceConfig;
use crate::interceptor::headers::CONTENT_TYPE_JSON;
use crate::interceptor::{ApiResult, HttpRequest, Interceptor, KauthError};
use crate::session::{LivenessProbe, ProbeOutcome};

/// Runs calls through adapt -> send -> verify -> decode
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ServiceConfig>,
    interceptor: Interceptor,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(
        config: Arc<ServiceConfig>,
        interceptor: Interceptor,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            interceptor,
            transport,
        }
    }

    /// `apiDomain + path`
    pub fn build_url(&self, path: &str) -> Result<Url, KauthError> {
        Ok(Url::parse(&self.config.full_url(path))?)
    }

    /// Call an endpoint and decode the rebuilt envelope
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<ApiResult<T>, KauthError> {
        let bytes = self.request_raw(endpoint).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Failed to decode response for {}: {}", endpoint.path, e);
            KauthError::ResponseParseFailed(e.to_string())
        })
    }

    /// Call an endpoint and return the verified body bytes
    pub async fn request_raw(&self, endpoint: &Endpoint) -> Result<Vec<u8>, KauthError> {
        let mut request = HttpRequest::new(endpoint.method.clone(), self.build_url(&endpoint.path)?);
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        request.body = endpoint.body.clone();

        let signed = self.interceptor.adapt(request)?;
        let response = self.transport.send(signed.clone()).await?;
        debug!("{} answered HTTP {}", endpoint.path, response.status);

        self.interceptor.verify(&response, &signed)
    }
}

#[async_trait]
impl LivenessProbe for ApiClient {
    async fn probe(&self) -> ProbeOutcome {
        match self.request::<Value>(&Endpoint::pong()).await {
            Ok(result) => ProbeOutcome::Envelope {
                code: result.code.unwrap_or(-1),
                msg: result.msg,
            },
            Err(e) => ProbeOutcome::TransportFailure(e.to_string()),
        }
    }
}
