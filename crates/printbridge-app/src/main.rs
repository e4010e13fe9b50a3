// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print bridge daemon.
//
// Entry point. Initialises logging, loads configuration, wires the HTTP job
// source, the document fetcher and the raw printer link into the relay, and
// runs it until Ctrl-C.

use std::path::PathBuf;
use std::process::ExitCode;

use printbridge_core::config::BridgeConfig;
use printbridge_core::error::Result;
use printbridge_print::RawPrinterLink;
use printbridge_relay::Relay;
use printbridge_source::{HttpDocumentFetcher, HttpJobSource, http_client};

/// Environment variable naming the JSON config file.
const CONFIG_ENV: &str = "PRINTBRIDGE_CONFIG";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "print bridge failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_ENV))
        .map(PathBuf::from);
    let config = BridgeConfig::load(config_path.as_deref())?;

    tracing::info!(
        job_source = %config.job_source_url,
        printer = %format!("{}:{}", config.printer_host, config.printer_port),
        language = config.language.pjl_keyword(),
        "print bridge configured"
    );

    let client = http_client(&config)?;
    let relay = Relay::new(
        HttpJobSource::from_config(client.clone(), &config)?,
        HttpDocumentFetcher::new(client, config.chunk_size),
        RawPrinterLink::from_config(&config),
    )
    .with_config(&config);

    relay
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "could not listen for Ctrl-C, running until killed");
                std::future::pending::<()>().await;
            }
        })
        .await;
    Ok(())
}
