// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Streaming document fetcher.
//
// The document body is pulled from the HTTP response one network frame at a
// time and handed on in fixed-size chunks. The whole payload is never held in
// memory.

use tracing::{debug, info, instrument};

use printbridge_core::error::{BridgeError, Result};
use printbridge_core::traits::{ByteStream, DocumentFetcher};

use crate::rechunk::Rechunker;

/// Default working buffer size.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Opens documents over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
    chunk_size: usize,
}

impl HttpDocumentFetcher {
    pub fn new(client: reqwest::Client, chunk_size: usize) -> Self {
        Self { client, chunk_size }
    }
}

impl DocumentFetcher for HttpDocumentFetcher {
    type Stream = HttpByteStream;

    #[instrument(skip(self))]
    async fn open_stream(&self, url: &str) -> Result<HttpByteStream> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BridgeError::Fetch(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Fetch(format!("GET {url}: HTTP {status}")));
        }

        info!(
            status = status.as_u16(),
            content_length = response.content_length(),
            "document stream opened"
        );
        Ok(HttpByteStream {
            response,
            rechunker: Rechunker::new(self.chunk_size),
            finished: false,
            received: 0,
        })
    }
}

/// Body of an open document response.
#[derive(Debug)]
pub struct HttpByteStream {
    response: reqwest::Response,
    rechunker: Rechunker,
    finished: bool,
    received: u64,
}

impl ByteStream for HttpByteStream {
    async fn next_chunk(&mut self) -> Option<Result<Vec<u8>>> {
        loop {
            if let Some(chunk) = self.rechunker.pop_full() {
                return Some(Ok(chunk));
            }
            if self.finished {
                return self.rechunker.finish().map(Ok);
            }
            match self.response.chunk().await {
                Ok(Some(frame)) => {
                    self.received += frame.len() as u64;
                    self.rechunker.push(&frame);
                }
                Ok(None) => {
                    debug!(received = self.received, "document body complete");
                    self.finished = true;
                }
                Err(e) => {
                    self.finished = true;
                    self.rechunker.clear();
                    return Some(Err(BridgeError::Stream(format!(
                        "body read failed after {} bytes: {e}",
                        self.received
                    ))));
                }
            }
        }
    }
}
