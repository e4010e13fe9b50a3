// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixed-size working buffer for streamed documents.
//
// Network frames arrive in whatever sizes the transport picks. The fetcher
// pushes them in here and pops out `chunk_size` pieces, so every chunk handed
// to the printer has the same size except the final one.

/// Re-slices an incoming byte sequence into fixed-size chunks.
#[derive(Debug)]
pub struct Rechunker {
    buf: Vec<u8>,
    chunk_size: usize,
}

impl Rechunker {
    /// A zero `chunk_size` is treated as 1.
    pub fn new(chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            buf: Vec::with_capacity(chunk_size),
            chunk_size,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Take one full chunk if enough bytes are buffered.
    pub fn pop_full(&mut self) -> Option<Vec<u8>> {
        if self.buf.len() < self.chunk_size {
            return None;
        }
        let rest = self.buf.split_off(self.chunk_size);
        Some(std::mem::replace(&mut self.buf, rest))
    }

    /// Take whatever is left once the input has ended.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.buf.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buf))
        }
    }

    /// Discard buffered bytes (after a broken transfer).
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}
