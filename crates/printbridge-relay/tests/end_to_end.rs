// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Relay against a mock job source over HTTP and a local TCP "printer".

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use printbridge_core::config::BridgeConfig;
use printbridge_core::types::{IterationOutcome, PdlLanguage};
use printbridge_print::{RawPrinterLink, pjl};
use printbridge_relay::Relay;
use printbridge_source::{HttpDocumentFetcher, HttpJobSource, http_client};

async fn printer() -> (u16, tokio::task::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let capture = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut received = Vec::new();
        socket.read_to_end(&mut received).await.expect("read");
        received
    });
    (port, capture)
}

fn config(source_url: String, port: u16) -> BridgeConfig {
    BridgeConfig {
        job_source_url: source_url,
        printer_host: "127.0.0.1".into(),
        printer_port: port,
        connect_timeout_ms: 2000,
        ..Default::default()
    }
}

#[tokio::test]
async fn job_is_printed_and_reported() {
    let mut server = mockito::Server::new_async().await;
    let document: Vec<u8> = (0..10_000u32).map(|i| (i % 253) as u8).collect();

    let job = server
        .mock("GET", "/api/job")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"J1","url":"/api/pdf/J1","copies":3}"#)
        .create_async()
        .await;
    let pdf = server
        .mock("GET", "/api/pdf/J1")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(document.clone())
        .expect(1)
        .create_async()
        .await;
    let done = server
        .mock("DELETE", "/api/job/J1")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let (port, capture) = printer().await;
    let config = config(server.url(), port);
    let client = http_client(&config).expect("client");
    let relay = Relay::new(
        HttpJobSource::from_config(client.clone(), &config).expect("source"),
        HttpDocumentFetcher::new(client, config.chunk_size),
        RawPrinterLink::from_config(&config),
    )
    .with_config(&config);

    let outcome = relay.run_once().await;
    assert_eq!(
        outcome,
        IterationOutcome::Printed {
            bytes_sent: 10_000,
            reported: true
        }
    );

    let received = capture.await.expect("join");
    let mut expected = pjl::job_header(3, PdlLanguage::Pdf);
    expected.extend_from_slice(&document);
    expected.extend_from_slice(&pjl::job_footer());
    assert_eq!(received, expected);

    job.assert_async().await;
    pdf.assert_async().await;
    done.assert_async().await;
}

#[tokio::test]
async fn missing_document_aborts_printer_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/job")
        .with_status(200)
        .with_body(r#"{"id":"J2","url":"/api/pdf/J2"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/pdf/J2")
        .with_status(404)
        .create_async()
        .await;
    let done = server
        .mock("DELETE", "/api/job/J2")
        .expect(0)
        .create_async()
        .await;

    let (port, capture) = printer().await;
    let config = config(server.url(), port);
    let client = http_client(&config).expect("client");
    let relay = Relay::new(
        HttpJobSource::from_config(client.clone(), &config).expect("source"),
        HttpDocumentFetcher::new(client, config.chunk_size),
        RawPrinterLink::from_config(&config),
    );

    assert_eq!(relay.run_once().await, IterationOutcome::FetchFailed);

    // Header only: the session was closed without a footer.
    let received = capture.await.expect("join");
    assert_eq!(received, pjl::job_header(1, PdlLanguage::Pdf));
    done.assert_async().await;
}

#[tokio::test]
async fn unreachable_printer_never_fetches() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/job")
        .with_status(200)
        .with_body(r#"{"id":"J3","url":"/api/pdf/J3"}"#)
        .create_async()
        .await;
    let pdf = server
        .mock("GET", "/api/pdf/J3")
        .expect(0)
        .create_async()
        .await;

    // Nothing listens on this port once the listener is dropped.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let config = config(server.url(), port);
    let client = http_client(&config).expect("client");
    let relay = Relay::new(
        HttpJobSource::from_config(client.clone(), &config).expect("source"),
        HttpDocumentFetcher::new(client, config.chunk_size),
        RawPrinterLink::from_config(&config).with_timeout(Duration::from_secs(2)),
    );

    assert_eq!(relay.run_once().await, IterationOutcome::ConnectFailed);
    pdf.assert_async().await;
}

#[tokio::test]
async fn empty_queue_is_idle() {
    let mut server = mockito::Server::new_async().await;
    let polls = server
        .mock("GET", "/api/job")
        .with_status(204)
        .expect(2)
        .create_async()
        .await;

    let config = config(server.url(), 9);
    let client = http_client(&config).expect("client");
    let relay = Relay::new(
        HttpJobSource::from_config(client.clone(), &config).expect("source"),
        HttpDocumentFetcher::new(client, config.chunk_size),
        RawPrinterLink::from_config(&config),
    );

    assert_eq!(relay.run_once().await, IterationOutcome::Idle);
    assert_eq!(relay.run_once().await, IterationOutcome::Idle);
    polls.assert_async().await;
}
