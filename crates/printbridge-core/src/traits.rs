// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Seams between the relay state machine and its three collaborators.
//
// The relay only talks to these traits. The HTTP and TCP implementations live
// in `printbridge-source` and `printbridge-print`; tests substitute in-memory
// fakes that record the order of calls.

use crate::error::Result;
use crate::types::{JobId, PollResult};

/// Remote queue that hands out jobs and accepts completion reports.
#[allow(async_fn_in_trait)]
pub trait JobSource {
    /// Ask for the next pending job.
    async fn poll(&self) -> PollResult;

    /// Acknowledge a printed job. Best-effort: the caller only logs failures.
    async fn report_complete(&self, id: &JobId) -> Result<()>;

    /// Check whether the source is reachable at all.
    async fn health(&self) -> Result<()>;
}

/// Pull-based, forward-only sequence of document bytes.
#[allow(async_fn_in_trait)]
pub trait ByteStream {
    /// Next chunk, `Some(Err(_))` if the transfer broke, `None` at the end.
    async fn next_chunk(&mut self) -> Option<Result<Vec<u8>>>;
}

/// Opens documents for streaming.
#[allow(async_fn_in_trait)]
pub trait DocumentFetcher {
    type Stream: ByteStream;

    async fn open_stream(&self, url: &str) -> Result<Self::Stream>;
}

/// An open printer session.
#[allow(async_fn_in_trait)]
pub trait PrinterConnection {
    /// Reset the interpreter, request `copies`, enter the document language.
    async fn send_job_header(&mut self, copies: u32) -> Result<()>;

    /// Write document bytes verbatim.
    async fn forward(&mut self, chunk: &[u8]) -> Result<()>;

    /// Signal end of job.
    async fn send_job_footer(&mut self) -> Result<()>;

    /// Close the session. Takes `self` so a handle is released at most once.
    async fn release(self) -> Result<()>;
}

/// Factory for printer sessions against one fixed endpoint.
#[allow(async_fn_in_trait)]
pub trait PrinterLink {
    type Connection: PrinterConnection;

    async fn connect(&self) -> Result<Self::Connection>;
}
