// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print bridge network side — the job source client and the streaming
// document fetcher, both over one shared `reqwest` client.

pub mod fetcher;
pub mod job_client;
pub mod rechunk;

pub use fetcher::{HttpByteStream, HttpDocumentFetcher};
pub use job_client::HttpJobSource;

use printbridge_core::config::BridgeConfig;
use printbridge_core::error::{BridgeError, Result};

/// Build the HTTP client shared by the job source and the fetcher.
///
/// Only connection establishment is bounded; reads run as long as the
/// transport keeps them alive.
pub fn http_client(config: &BridgeConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout())
        .user_agent(concat!("printbridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| BridgeError::Config(format!("HTTP client: {e}")))
}
