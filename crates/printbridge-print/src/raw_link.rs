// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP printer link (JetDirect, port 9100).
//
// Open a TCP socket, write a PJL preamble, dump the document, write the PJL
// trailer, close. The printer gives no acknowledgement, so "sent" means the
// local transport accepted every write.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument};

use printbridge_core::config::BridgeConfig;
use printbridge_core::error::{BridgeError, Result};
use printbridge_core::traits::{PrinterConnection, PrinterLink};
use printbridge_core::types::PdlLanguage;

use crate::pjl;

/// Default raw TCP port (HP JetDirect).
pub const RAW_PORT: u16 = 9100;

/// Connects to one fixed printer endpoint.
#[derive(Debug, Clone)]
pub struct RawPrinterLink {
    addr: String,
    connect_timeout: Duration,
    language: PdlLanguage,
}

impl RawPrinterLink {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            addr: format!("{host}:{port}"),
            connect_timeout: Duration::from_secs(10),
            language: PdlLanguage::Pdf,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.printer_host, config.printer_port)
            .with_timeout(config.connect_timeout())
            .with_language(config.language)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_language(mut self, language: PdlLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl PrinterLink for RawPrinterLink {
    type Connection = RawConnection;

    #[instrument(skip_all, fields(addr = %self.addr))]
    async fn connect(&self) -> Result<RawConnection> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| {
                BridgeError::Connect(format!(
                    "raw TCP connection to {} timed out after {}ms",
                    self.addr,
                    self.connect_timeout.as_millis()
                ))
            })?
            .map_err(|e| BridgeError::Connect(format!("raw TCP connect to {}: {e}", self.addr)))?;

        info!("connected to printer");
        Ok(RawConnection {
            stream,
            addr: self.addr.clone(),
            language: self.language,
            sent: 0,
        })
    }
}

/// An open printer socket. Dropping it closes the socket; `release` also
/// flushes and shuts down the write half first.
#[derive(Debug)]
pub struct RawConnection {
    stream: TcpStream,
    addr: String,
    language: PdlLanguage,
    /// Document bytes written so far (framing excluded).
    sent: u64,
}

impl RawConnection {
    async fn write(&mut self, bytes: &[u8], what: &str) -> Result<()> {
        self.stream.write_all(bytes).await.map_err(|e| {
            BridgeError::PrinterWrite(format!(
                "{what} to {} failed after {} document bytes: {e}",
                self.addr, self.sent
            ))
        })
    }
}

impl PrinterConnection for RawConnection {
    async fn send_job_header(&mut self, copies: u32) -> Result<()> {
        let header = pjl::job_header(copies, self.language);
        self.write(&header, "PJL header").await?;
        debug!(copies, language = self.language.pjl_keyword(), "PJL header sent");
        Ok(())
    }

    async fn forward(&mut self, chunk: &[u8]) -> Result<()> {
        self.write(chunk, "document chunk").await?;
        self.sent += chunk.len() as u64;
        debug!(sent = self.sent, "raw TCP progress");
        Ok(())
    }

    async fn send_job_footer(&mut self) -> Result<()> {
        self.write(&pjl::job_footer(), "PJL footer").await?;
        debug!("PJL footer sent");
        Ok(())
    }

    async fn release(mut self) -> Result<()> {
        self.stream
            .flush()
            .await
            .map_err(|e| BridgeError::PrinterWrite(format!("raw TCP flush: {e}")))?;
        self.stream
            .shutdown()
            .await
            .map_err(|e| BridgeError::PrinterWrite(format!("raw TCP shutdown: {e}")))?;
        debug!(addr = %self.addr, sent = self.sent, "printer connection released");
        Ok(())
    }
}
