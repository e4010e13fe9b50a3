// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.
//
// Settings come from an optional JSON file, then `PRINTBRIDGE_*` environment
// variables override individual fields, then the result is validated once at
// startup. Nothing is re-read while the relay runs.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::types::PdlLanguage;

/// Prefix shared by all environment overrides.
pub const ENV_PREFIX: &str = "PRINTBRIDGE_";

/// Runtime settings for the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Base URL of the job source (`<base>/api/job`).
    pub job_source_url: String,
    /// Printer address (IP or hostname).
    pub printer_host: String,
    /// Raw print port on the printer (default 9100).
    pub printer_port: u16,
    /// Delay between the end of one iteration and the next poll.
    pub poll_interval_ms: u64,
    /// Wait before the first poll so the network can come up.
    pub startup_delay_ms: u64,
    /// Upper bound on establishing the printer connection.
    pub connect_timeout_ms: u64,
    /// Size of the working buffer used when streaming documents.
    pub chunk_size: usize,
    /// Largest poll response body accepted before the query fails.
    pub max_poll_body_bytes: usize,
    /// Language the printer is switched into for the document body.
    pub language: PdlLanguage,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            job_source_url: "http://127.0.0.1:8787".into(),
            printer_host: "192.168.1.9".into(),
            printer_port: 9100,
            poll_interval_ms: 5000,
            startup_delay_ms: 3000,
            connect_timeout_ms: 10_000,
            chunk_size: 4096,
            max_poll_body_bytes: 4096,
            language: PdlLanguage::Pdf,
        }
    }
}

impl BridgeConfig {
    /// Load from an optional JSON file, apply environment overrides and
    /// validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply `PRINTBRIDGE_*` overrides fetched through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(url) = var("JOB_SOURCE_URL") {
            self.job_source_url = url;
        }
        if let Some(host) = var("PRINTER_HOST") {
            self.printer_host = host;
        }
        if let Some(port) = var("PRINTER_PORT") {
            self.printer_port = port
                .parse()
                .map_err(|e| BridgeError::Config(format!("PRINTER_PORT {port:?}: {e}")))?;
        }
        if let Some(interval) = var("POLL_INTERVAL_MS") {
            self.poll_interval_ms = interval
                .parse()
                .map_err(|e| BridgeError::Config(format!("POLL_INTERVAL_MS {interval:?}: {e}")))?;
        }
        Ok(())
    }

    /// Reject settings the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        let url = self.job_source_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(BridgeError::Config(format!(
                "job_source_url must be an http(s) URL, got {url:?}"
            )));
        }
        if self.printer_host.trim().is_empty() {
            return Err(BridgeError::Config("printer_host is empty".into()));
        }
        if self.printer_port == 0 {
            return Err(BridgeError::Config("printer_port must be non-zero".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(BridgeError::Config("poll_interval_ms must be positive".into()));
        }
        if self.chunk_size == 0 {
            return Err(BridgeError::Config("chunk_size must be positive".into()));
        }
        if self.max_poll_body_bytes == 0 {
            return Err(BridgeError::Config(
                "max_poll_body_bytes must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
