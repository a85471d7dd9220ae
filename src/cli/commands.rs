// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Args;
use futures::FutureExt;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use url::Url;

use crate::config::KauthSettings;
use crate::context::KauthContext;
use crate::crypto::{aes_decrypt_base64, aes_encrypt_base64};
use crate::interceptor::{HttpRequest, HttpResponse};
use crate::session::{LivenessProbe, SessionEnded};
use crate::transport::{ReqwestTransport, Transport};

/// Arguments for encrypt / decrypt
#[derive(Args, Debug)]
pub struct CipherArgs {
    /// Plaintext (encrypt) or base64 ciphertext (decrypt)
    pub input: String,

    /// AES key; defaults to the configured program secret
    #[arg(long, env = "KAUTH_AES_KEY")]
    pub key: Option<String>,
}

/// Arguments for sign
#[derive(Args, Debug)]
pub struct SignArgs {
    /// API path, e.g. /api/consumer/user/pong
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,
}

/// Arguments for unwrap-response
#[derive(Args, Debug)]
pub struct UnwrapArgs {
    /// File holding the raw response body; `-` reads stdin
    pub file: PathBuf,

    /// Request path the response belongs to
    #[arg(long, default_value = "/")]
    pub path: String,
}

/// Arguments for heartbeat
#[derive(Args, Debug)]
pub struct HeartbeatArgs {
    /// Override the probe interval
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

fn cipher_key(args: &CipherArgs, settings: &KauthSettings) -> Result<String> {
    match &args.key {
        Some(key) => Ok(key.clone()),
        None if !settings.service.program_secret.is_empty() => {
            Ok(settings.service.program_secret.clone())
        }
        None => Err(anyhow!(
            "no key: pass --key or configure programSecret"
        )),
    }
}

pub fn encrypt(args: &CipherArgs, settings: &KauthSettings) -> Result<()> {
    let key = cipher_key(args, settings)?;
    let ciphertext = aes_encrypt_base64(&args.input, &key).context("encrypting input")?;
    println!("{}", ciphertext);
    Ok(())
}

pub fn decrypt(args: &CipherArgs, settings: &KauthSettings) -> Result<()> {
    let key = cipher_key(args, settings)?;
    let plaintext = aes_decrypt_base64(&args.input, &key).context("decrypting input")?;
    println!("{}", plaintext);
    Ok(())
}

pub fn device_id(context: &KauthContext) -> Result<()> {
    println!("{}", context.credentials().device_id());
    Ok(())
}

pub fn sign(args: &SignArgs, context: &KauthContext, settings: &KauthSettings) -> Result<()> {
    let url = Url::parse(&context.config().full_url(&args.path))
        .with_context(|| format!("building URL for {}", args.path))?;
    let mut request = HttpRequest::post(url);
    request.body = args.body.as_ref().map(|b| b.as_bytes().to_vec());

    let signed = context
        .interceptor(settings.interceptor.clone())
        .adapt(request)
        .context("signing request")?;

    let headers: serde_json::Map<String, serde_json::Value> = signed
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                serde_json::Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();
    let body = signed
        .body
        .as_deref()
        .map(String::from_utf8_lossy)
        .unwrap_or_default();

    let output = serde_json::json!({
        "url": signed.url.as_str(),
        "headers": headers,
        "body": body,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn unwrap_response(
    args: &UnwrapArgs,
    context: &KauthContext,
    settings: &KauthSettings,
) -> Result<()> {
    let raw = if args.file.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading response from stdin")?;
        buf
    } else {
        std::fs::read(&args.file)
            .with_context(|| format!("reading {}", args.file.display()))?
    };

    let url = Url::parse(&context.config().full_url(&args.path))?;
    let verified = context
        .interceptor(settings.interceptor.clone())
        .verify(&HttpResponse::new(200, raw), &HttpRequest::post(url))
        .context("verifying response")?;

    println!("{}", String::from_utf8_lossy(&verified));
    Ok(())
}

fn live_client(context: &KauthContext, settings: &KauthSettings) -> Result<Arc<dyn LivenessProbe>> {
    let transport: Arc<dyn Transport> =
        Arc::new(ReqwestTransport::new().context("building HTTP client")?);
    Ok(Arc::new(
        context.api_client(transport, settings.interceptor.clone()),
    ))
}

pub async fn ping(context: &KauthContext, settings: &KauthSettings) -> Result<()> {
    let outcome = live_client(context, settings)?.probe().await;
    println!("{:?}", outcome);
    Ok(())
}

pub async fn heartbeat(
    args: &HeartbeatArgs,
    context: &KauthContext,
    settings: &KauthSettings,
) -> Result<()> {
    let mut liveness = settings.liveness.clone();
    if let Some(secs) = args.interval_secs {
        liveness.interval_secs = secs;
    }

    let monitor = context.liveness_monitor(live_client(context, settings)?, liveness);

    let (tx, mut rx) = mpsc::unbounded_channel::<SessionEnded>();
    monitor
        .on_session_ended(move |ended| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(ended);
            }
            .boxed()
        })
        .await;

    monitor.start().await;
    info!("Heartbeat running, press Ctrl-C to stop");

    tokio::select! {
        ended = rx.recv() => {
            if let Some(ended) = ended {
                warn!("{}", ended);
                println!("{}", ended.message);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
        }
    }

    monitor.stop().await;
    Ok(())
}
