// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the print bridge.

use thiserror::Error;

/// Top-level error type for all print bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Job source --
    #[error("job query failed: {0}")]
    Query(String),

    #[error("job source response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },

    #[error("completion report failed: {0}")]
    Report(String),

    #[error("completion report rejected with HTTP {status}")]
    ReportRejected { status: u16 },

    // -- Document fetch --
    #[error("document fetch failed: {0}")]
    Fetch(String),

    #[error("document stream interrupted: {0}")]
    Stream(String),

    // -- Printer link --
    #[error("printer connection failed: {0}")]
    Connect(String),

    #[error("printer write failed: {0}")]
    PrinterWrite(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
