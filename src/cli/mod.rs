// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::KauthSettings;
use crate::context::KauthContext;

/// KAuth client CLI
#[derive(Parser, Debug)]
#[command(name = "kauth-cli")]
#[command(version)]
#[command(about = "Sign, encrypt and probe KAuth API calls", long_about = None)]
pub struct Cli {
    /// TOML settings file; KAUTH_* environment variables override it
    #[arg(long, global = true, env = "KAUTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON file for persisted credentials (device id, token); in-memory if omitted
    #[arg(long, global = true, env = "KAUTH_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the device id, creating it if needed
    DeviceId,

    /// AES-encrypt a string with the program secret
    Encrypt(commands::CipherArgs),

    /// AES-decrypt a base64 string with the program secret
    Decrypt(commands::CipherArgs),

    /// Show the body and headers a request would be sent with
    Sign(commands::SignArgs),

    /// Verify and decrypt a saved response body
    UnwrapResponse(commands::UnwrapArgs),

    /// Send one liveness probe
    Ping,

    /// Run the liveness monitor until Ctrl-C or the session ends
    Heartbeat(commands::HeartbeatArgs),
}

impl Cli {
    /// Settings from `--config` (if any) overlaid with environment variables
    pub fn load_settings(&self) -> Result<KauthSettings> {
        let mut settings = match &self.config {
            Some(path) => KauthSettings::from_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => KauthSettings::default(),
        };
        settings
            .apply_env()
            .context("applying KAUTH_* environment variables")?;
        Ok(settings)
    }

    /// Validated context, backed by `--store` when given
    pub fn build_context(&self, settings: &KauthSettings) -> Result<KauthContext> {
        let service = settings.service.clone();
        match &self.store {
            Some(path) => KauthContext::with_file_store(service, path)
                .with_context(|| format!("opening credential store {}", path.display())),
            None => KauthContext::from_config(service).context("invalid service configuration"),
        }
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let settings = cli.load_settings()?;

    match &cli.command {
        Commands::Encrypt(args) => commands::encrypt(args, &settings),
        Commands::Decrypt(args) => commands::decrypt(args, &settings),
        Commands::DeviceId => {
            let context = cli.build_context(&settings)?;
            commands::device_id(&context)
        }
        Commands::Sign(args) => {
            let context = cli.build_context(&settings)?;
            commands::sign(args, &context, &settings)
        }
        Commands::UnwrapResponse(args) => {
            let context = cli.build_context(&settings)?;
            commands::unwrap_response(args, &context, &settings)
        }
        Commands::Ping => {
            let context = cli.build_context(&settings)?;
            commands::ping(&context, &settings).await
        }
        Commands::Heartbeat(args) => {
            let context = cli.build_context(&settings)?;
            commands::heartbeat(args, &context, &settings).await
        }
    }
}
