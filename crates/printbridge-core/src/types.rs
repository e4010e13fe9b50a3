// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the print bridge.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Upper bound for the copies directive sent to the printer.
pub const MAX_COPIES: u32 = 999;

/// Identifier of a job, assigned by the job source.
///
/// Opaque to the bridge: it is only echoed back in the completion report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of work handed out by the job source.
///
/// Lives for a single relay iteration and is dropped when it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub id: JobId,
    /// Absolute URL of the document to print.
    pub document_url: String,
    /// Physical copies, always in `1..=MAX_COPIES`.
    pub copies: u32,
}

impl JobRecord {
    pub fn new(id: impl Into<String>, document_url: impl Into<String>, copies: u32) -> Self {
        Self {
            id: JobId(id.into()),
            document_url: document_url.into(),
            copies: normalize_copies(Some(i64::from(copies))),
        }
    }
}

/// Clamp a requested copy count into `1..=MAX_COPIES`.
///
/// `None` (absent or non-numeric in the job body) means one copy.
pub fn normalize_copies(requested: Option<i64>) -> u32 {
    match requested {
        Some(n) if n >= 1 => n.min(i64::from(MAX_COPIES)) as u32,
        _ => 1,
    }
}

/// Outcome of asking the job source for work.
#[derive(Debug)]
pub enum PollResult {
    /// Nothing pending, or the response did not describe a usable job.
    NoJob,
    Job(JobRecord),
    /// The query itself failed (transport error, oversized body).
    QueryFailed(BridgeError),
}

/// What a single relay iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// No job was pending.
    Idle,
    QueryFailed,
    /// The printer could not be reached; the job was dropped.
    ConnectFailed,
    /// The document could not be opened; the printer session was aborted
    /// without a footer.
    FetchFailed,
    /// Streaming broke part way through (read or write failure).
    StreamFailed { bytes_sent: u64 },
    /// The full document and footer were accepted by the transport.
    /// `reported` tells whether the completion report succeeded.
    Printed { bytes_sent: u64, reported: bool },
}

impl IterationOutcome {
    /// Short label for structured log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::QueryFailed => "query-failed",
            Self::ConnectFailed => "connect-failed",
            Self::FetchFailed => "fetch-failed",
            Self::StreamFailed { .. } => "stream-failed",
            Self::Printed { .. } => "printed",
        }
    }
}

/// Page-description language the printer is switched into for the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PdlLanguage {
    #[default]
    Pdf,
    PostScript,
    Pcl,
}

impl PdlLanguage {
    /// Keyword for `@PJL ENTER LANGUAGE=`.
    pub fn pjl_keyword(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::PostScript => "POSTSCRIPT",
            Self::Pcl => "PCL",
        }
    }
}
