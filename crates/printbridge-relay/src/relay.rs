// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The relay loop: poll → connect → header → stream → footer → release → report.
//
// One job at a time. The job record and the printer connection are locals of
// `run_once`, so neither can outlive the iteration that created them. Every
// failure ends the iteration with an `IterationOutcome`; nothing stops the
// loop. The only throttle is the fixed sleep between iterations.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use printbridge_core::config::BridgeConfig;
use printbridge_core::traits::{ByteStream, DocumentFetcher, JobSource, PrinterConnection, PrinterLink};
use printbridge_core::types::{IterationOutcome, JobRecord, PollResult};

/// Counters kept across iterations, logged when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub iterations: u64,
    pub printed: u64,
    /// Jobs dropped after connect, fetch or stream failures.
    pub dropped: u64,
    /// Printed jobs whose completion report failed.
    pub unreported: u64,
    pub query_failures: u64,
}

impl RelayStats {
    fn record(&mut self, outcome: IterationOutcome) {
        self.iterations += 1;
        match outcome {
            IterationOutcome::Idle => {}
            IterationOutcome::QueryFailed => self.query_failures += 1,
            IterationOutcome::ConnectFailed
            | IterationOutcome::FetchFailed
            | IterationOutcome::StreamFailed { .. } => self.dropped += 1,
            IterationOutcome::Printed { reported, .. } => {
                self.printed += 1;
                if !reported {
                    self.unreported += 1;
                }
            }
        }
    }
}

/// Drives one job source, one document fetcher and one printer.
pub struct Relay<S, F, P> {
    source: S,
    fetcher: F,
    printer: P,
    poll_interval: Duration,
    startup_delay: Duration,
}

impl<S, F, P> Relay<S, F, P>
where
    S: JobSource,
    F: DocumentFetcher,
    P: PrinterLink,
{
    pub fn new(source: S, fetcher: F, printer: P) -> Self {
        let defaults = BridgeConfig::default();
        Self {
            source,
            fetcher,
            printer,
            poll_interval: defaults.poll_interval(),
            startup_delay: defaults.startup_delay(),
        }
    }

    /// Take poll interval and startup delay from the config.
    pub fn with_config(self, config: &BridgeConfig) -> Self {
        self.with_timing(config.poll_interval(), config.startup_delay())
    }

    pub fn with_timing(mut self, poll_interval: Duration, startup_delay: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.startup_delay = startup_delay;
        self
    }

    /// Poll until `shutdown` resolves.
    ///
    /// Shutdown is only observed while waiting (before the first poll and
    /// between iterations); a job that has started streaming always runs to
    /// its end.
    pub async fn run<Sd>(&self, shutdown: Sd) -> RelayStats
    where
        Sd: Future<Output = ()>,
    {
        let mut stats = RelayStats::default();
        tokio::pin!(shutdown);

        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            startup_delay_ms = self.startup_delay.as_millis() as u64,
            "print bridge started"
        );

        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested before first poll");
                return stats;
            }
            _ = tokio::time::sleep(self.startup_delay) => {}
        }

        match self.source.health().await {
            Ok(()) => info!("job source reachable"),
            Err(e) => warn!(error = %e, "job source health check failed, polling anyway"),
        }

        loop {
            let outcome = self.run_once().await;
            stats.record(outcome);
            debug!(outcome = outcome.label(), iteration = stats.iterations, "iteration finished");

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!(
            iterations = stats.iterations,
            printed = stats.printed,
            dropped = stats.dropped,
            unreported = stats.unreported,
            "print bridge stopped"
        );
        stats
    }

    /// One pass of the state machine.
    pub async fn run_once(&self) -> IterationOutcome {
        match self.source.poll().await {
            PollResult::NoJob => IterationOutcome::Idle,
            PollResult::QueryFailed(e) => {
                warn!(error = %e, "job query failed");
                IterationOutcome::QueryFailed
            }
            PollResult::Job(job) => self.print_job(job).await,
        }
    }

    #[instrument(skip_all, fields(job_id = %job.id, copies = job.copies))]
    async fn print_job(&self, job: JobRecord) -> IterationOutcome {
        let mut conn = match self.printer.connect().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "printer unreachable, dropping job");
                return IterationOutcome::ConnectFailed;
            }
        };

        let bytes_sent = match self.stream_document(&mut conn, &job).await {
            Ok(bytes_sent) => bytes_sent,
            Err(outcome) => {
                release(conn).await;
                return outcome;
            }
        };

        if let Err(e) = conn.send_job_footer().await {
            warn!(error = %e, bytes_sent, "PJL footer write failed, not reporting completion");
            release(conn).await;
            return IterationOutcome::StreamFailed { bytes_sent };
        }
        release(conn).await;
        info!(bytes_sent, "document sent to printer");

        let reported = match self.source.report_complete(&job.id).await {
            Ok(()) => {
                info!("job completed");
                true
            }
            Err(e) => {
                warn!(error = %e, "completion report failed, job may be redelivered");
                false
            }
        };
        IterationOutcome::Printed {
            bytes_sent,
            reported,
        }
    }

    /// Header, then the document body in order. Returns the number of body
    /// bytes written, or the outcome to end the iteration with.
    async fn stream_document(
        &self,
        conn: &mut P::Connection,
        job: &JobRecord,
    ) -> Result<u64, IterationOutcome> {
        if let Err(e) = conn.send_job_header(job.copies).await {
            warn!(error = %e, "PJL header write failed");
            return Err(IterationOutcome::StreamFailed { bytes_sent: 0 });
        }

        let mut stream = match self.fetcher.open_stream(&job.document_url).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, url = %job.document_url, "document unavailable, aborting without footer");
                return Err(IterationOutcome::FetchFailed);
            }
        };

        let mut bytes_sent = 0u64;
        while let Some(chunk) = stream.next_chunk().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(error = %e, bytes_sent, "document stream broke, aborting without footer");
                    return Err(IterationOutcome::StreamFailed { bytes_sent });
                }
            };
            if let Err(e) = conn.forward(&chunk).await {
                warn!(error = %e, bytes_sent, "printer write failed, aborting without footer");
                return Err(IterationOutcome::StreamFailed { bytes_sent });
            }
            bytes_sent += chunk.len() as u64;
        }
        Ok(bytes_sent)
    }
}

async fn release<C: PrinterConnection>(conn: C) {
    if let Err(e) = conn.release().await {
        warn!(error = %e, "printer connection did not close cleanly");
    }
}
