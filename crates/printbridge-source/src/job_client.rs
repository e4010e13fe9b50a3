// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP client for the remote job source.
//
//   GET    <base>/api/job        -> 200 {id, url, copies?} or anything else
//   DELETE <base>/api/job/<id>   -> completion report, best-effort
//   GET    <base>/api/health     -> reachability check at startup
//
// A body that does not describe a usable job is reported to the relay as
// `NoJob`, same as an empty queue, but logged separately so the two can be
// told apart.

use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use printbridge_core::config::BridgeConfig;
use printbridge_core::error::{BridgeError, Result};
use printbridge_core::traits::JobSource;
use printbridge_core::types::{JobId, JobRecord, PollResult, normalize_copies};

/// Client for one job source.
#[derive(Debug, Clone)]
pub struct HttpJobSource {
    client: reqwest::Client,
    base: Url,
    max_body_bytes: usize,
}

impl HttpJobSource {
    pub fn new(client: reqwest::Client, base_url: &str, max_body_bytes: usize) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| BridgeError::Config(format!("job source URL {base_url:?}: {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(BridgeError::Config(format!(
                "job source URL {base_url:?} is not an http(s) base"
            )));
        }
        Ok(Self {
            client,
            base,
            max_body_bytes,
        })
    }

    pub fn from_config(client: reqwest::Client, config: &BridgeConfig) -> Result<Self> {
        Self::new(client, &config.job_source_url, config.max_poll_body_bytes)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `<base>/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BridgeError::Config(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Read the response body, failing once it grows past the limit.
    async fn read_bounded(&self, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(BridgeError::ResponseTooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(frame) = response
            .chunk()
            .await
            .map_err(|e| BridgeError::Query(format!("reading job body: {e}")))?
        {
            if body.len() + frame.len() > limit {
                return Err(BridgeError::ResponseTooLarge { limit });
            }
            body.extend_from_slice(&frame);
        }
        Ok(body)
    }
}

impl JobSource for HttpJobSource {
    #[instrument(skip_all, fields(base = %self.base))]
    async fn poll(&self) -> PollResult {
        let url = match self.endpoint(&["api", "job"]) {
            Ok(url) => url,
            Err(e) => return PollResult::QueryFailed(e),
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return PollResult::QueryFailed(BridgeError::Query(e.to_string())),
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = status.as_u16(), "no job pending");
            return PollResult::NoJob;
        }

        let body = match self.read_bounded(response).await {
            Ok(body) => body,
            Err(e) => return PollResult::QueryFailed(e),
        };

        match parse_job(&body, &self.base) {
            Ok(job) => {
                info!(job_id = %job.id, copies = job.copies, url = %job.document_url, "job received");
                PollResult::Job(job)
            }
            Err(reason) => {
                warn!(reason = %reason, "malformed job body, treating as no job");
                PollResult::NoJob
            }
        }
    }

    #[instrument(skip_all, fields(job_id = %id))]
    async fn report_complete(&self, id: &JobId) -> Result<()> {
        let url = self.endpoint(&["api", "job", id.as_str()])?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| BridgeError::Report(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::ReportRejected {
                status: status.as_u16(),
            });
        }
        debug!(status = status.as_u16(), "completion acknowledged");
        Ok(())
    }

    async fn health(&self) -> Result<()> {
        let url = self.endpoint(&["api", "health"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BridgeError::Query(format!("health check: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Query(format!("health check: HTTP {status}")));
        }
        Ok(())
    }
}

/// Turn a poll body into a job, or say why it is not one.
///
/// `id` and `url` must be non-empty strings. `url` may be relative to the
/// job source. `copies` is optional; anything that is not a number means one
/// copy.
pub fn parse_job(body: &[u8], base: &Url) -> std::result::Result<JobRecord, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| format!("invalid JSON: {e}"))?;

    let id = non_empty_str(&value, "id")?;
    let raw_url = non_empty_str(&value, "url")?;

    let document_url = base
        .join(raw_url)
        .map_err(|e| format!("unusable document url {raw_url:?}: {e}"))?;
    if !matches!(document_url.scheme(), "http" | "https") {
        return Err(format!("document url {document_url} is not http(s)"));
    }

    let copies = value
        .get("copies")
        .and_then(|c| c.as_i64().or_else(|| c.as_f64().map(|f| f as i64)));

    Ok(JobRecord {
        id: JobId(id.to_string()),
        document_url: document_url.to_string(),
        copies: normalize_copies(copies),
    })
}

fn non_empty_str<'a>(value: &'a Value, field: &str) -> std::result::Result<&'a str, String> {
    match value.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => Ok(s),
        Some(_) => Err(format!("field {field:?} is empty")),
        None => Err(format!("field {field:?} missing or not a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://jobs.example.net/").expect("base")
    }

    fn source(server: &mockito::Server) -> HttpJobSource {
        HttpJobSource::new(reqwest::Client::new(), &server.url(), 4096).expect("source")
    }

    #[test]
    fn parses_full_job() {
        let job = parse_job(
            br#"{"id":"J1","url":"http://x/doc.pdf","copies":3}"#,
            &base(),
        )
        .expect("job");
        assert_eq!(job.id.as_str(), "J1");
        assert_eq!(job.document_url, "http://x/doc.pdf");
        assert_eq!(job.copies, 3);
    }

    #[test]
    fn missing_id_or_url_is_not_a_job() {
        assert!(parse_job(br#"{"url":"http://x/doc.pdf"}"#, &base()).is_err());
        assert!(parse_job(br#"{"id":"J1"}"#, &base()).is_err());
        assert!(parse_job(br#"{"id":"","url":"http://x/doc.pdf"}"#, &base()).is_err());
        assert!(parse_job(br#"{"id":7,"url":"http://x/doc.pdf"}"#, &base()).is_err());
        assert!(parse_job(br#"{"job":null}"#, &base()).is_err());
    }

    #[test]
    fn invalid_json_is_not_a_job() {
        assert!(parse_job(b"{\"id\":\"J1\",", &base()).is_err());
        assert!(parse_job(b"", &base()).is_err());
    }

    #[test]
    fn absent_or_non_numeric_copies_default_to_one() {
        for body in [
            br#"{"id":"J","url":"http://x/d"}"#.as_slice(),
            br#"{"id":"J","url":"http://x/d","copies":"three"}"#.as_slice(),
            br#"{"id":"J","url":"http://x/d","copies":null}"#.as_slice(),
            br#"{"id":"J","url":"http://x/d","copies":0}"#.as_slice(),
        ] {
            assert_eq!(parse_job(body, &base()).expect("job").copies, 1);
        }
    }

    #[test]
    fn relative_url_resolves_against_source() {
        let job = parse_job(br#"{"id":"abc","url":"/api/pdf/abc"}"#, &base()).expect("job");
        assert_eq!(job.document_url, "https://jobs.example.net/api/pdf/abc");
    }

    #[test]
    fn non_http_document_url_is_rejected() {
        assert!(parse_job(br#"{"id":"J","url":"file:///etc/passwd"}"#, &base()).is_err());
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let source = HttpJobSource::new(reqwest::Client::new(), "https://h.example/bridge/", 64)
            .expect("source");
        let url = source.endpoint(&["api", "job", "J 1"]).expect("url");
        assert_eq!(url.as_str(), "https://h.example/bridge/api/job/J%201");
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(HttpJobSource::new(reqwest::Client::new(), "mailto:jobs@example.net", 64).is_err());
    }

    #[tokio::test]
    async fn poll_returns_job() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/job")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"J1","url":"http://x/doc.pdf","copies":3}"#)
            .create_async()
            .await;

        match source(&server).poll().await {
            PollResult::Job(job) => {
                assert_eq!(job.id.as_str(), "J1");
                assert_eq!(job.copies, 3);
            }
            other => panic!("expected job, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn poll_treats_non_200_as_no_job() {
        let mut server = mockito::Server::new_async().await;
        for status in [204, 404, 500] {
            let mock = server
                .mock("GET", "/api/job")
                .with_status(status)
                .create_async()
                .await;
            assert!(matches!(source(&server).poll().await, PollResult::NoJob));
            mock.remove_async().await;
        }
    }

    #[tokio::test]
    async fn poll_treats_malformed_body_as_no_job() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/job")
            .with_status(200)
            .with_body(r#"{"id":"J1"}"#)
            .create_async()
            .await;
        assert!(matches!(source(&server).poll().await, PollResult::NoJob));
    }

    #[tokio::test]
    async fn oversized_body_fails_the_query() {
        let mut server = mockito::Server::new_async().await;
        let padding = "x".repeat(200);
        server
            .mock("GET", "/api/job")
            .with_status(200)
            .with_body(format!(r#"{{"id":"J1","url":"http://x/d","pad":"{padding}"}}"#))
            .create_async()
            .await;

        let source = HttpJobSource::new(reqwest::Client::new(), &server.url(), 64).expect("source");
        match source.poll().await {
            PollResult::QueryFailed(BridgeError::ResponseTooLarge { limit }) => assert_eq!(limit, 64),
            other => panic!("expected oversized failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_source_fails_the_query() {
        let source =
            HttpJobSource::new(reqwest::Client::new(), "http://127.0.0.1:1", 4096).expect("source");
        assert!(matches!(source.poll().await, PollResult::QueryFailed(_)));
    }

    #[tokio::test]
    async fn report_complete_sends_delete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/job/J1")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await;

        source(&server)
            .report_complete(&JobId::from("J1"))
            .await
            .expect("report");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_report_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/api/job/J1")
            .with_status(500)
            .create_async()
            .await;

        let err = source(&server)
            .report_complete(&JobId::from("J1"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::ReportRejected { status: 500 }));
    }

    #[tokio::test]
    async fn health_reports_reachability() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body(r#"{"status":"ok"}"#)
            .create_async()
            .await;
        source(&server).health().await.expect("healthy");

        let down =
            HttpJobSource::new(reqwest::Client::new(), "http://127.0.0.1:1", 4096).expect("source");
        assert!(down.health().await.is_err());
    }
}
