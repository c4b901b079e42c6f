//! Drive every client operation against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in a background thread, then
//! exercises the client over real HTTP through `UreqTransport`. Validates
//! that request building, headers, and response decoding work end-to-end.

use std::net::SocketAddr;

use flincap_core::{ClientConfig, FlincapClient, FlincapError};
use serde_json::{json, Value};

fn start_mock_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr, token: &str) -> FlincapClient {
    FlincapClient::new(token).with_base_url(&format!("http://{addr}"))
}

#[test]
fn public_endpoints() {
    let addr = start_mock_server();
    let client = client(addr, "");

    // Step 1: rate for a known pair.
    let rate = client.get_rate("BTC", "NGN").unwrap();
    assert_eq!(rate["selectedCrypt"], "BTC");
    assert_eq!(rate["selectedFiat"], "NGN");
    assert!(rate["rate"].as_f64().is_some());

    // Step 2: unknown pair surfaces the envelope.
    let err = client.get_rate("DOGE", "NGN").unwrap_err();
    match err {
        FlincapError::Api { status, message, code } => {
            assert_eq!(status, 400);
            assert_eq!(message, "unsupported currency pair");
            assert_eq!(code, "INVALID_PAIR");
        }
        other => panic!("expected Api error, got {other:?}"),
    }

    // Step 3: exchange listing.
    let exchange = client.get_exchange().unwrap();
    assert_eq!(exchange["name"], "flincap");
    assert!(exchange["pairs"].as_array().is_some_and(|pairs| !pairs.is_empty()));
}

#[test]
fn transaction_lifecycle() {
    let addr = start_mock_server();
    let client = client(addr, "test-token");
    assert!(client.is_authenticated());

    // Step 1: create two transactions.
    client
        .create_transaction(&json!({
            "id": "tx1",
            "transactionType": "buy",
            "selectedFiat": "NGN",
            "amount": 10,
        }))
        .unwrap();
    client
        .create_transaction(&json!({
            "id": "tx/2",
            "transactionType": "sell",
            "selectedFiat": "NGN",
            "amount": 5,
        }))
        .unwrap();

    // Step 2: fetch one back verbatim.
    let tx = client.get_transaction("tx1").unwrap();
    assert_eq!(
        Value::Object(tx),
        json!({"id": "tx1", "transactionType": "buy", "selectedFiat": "NGN", "amount": 10})
    );

    // Step 3: an id containing '/' stays a single path segment.
    let tx = client.get_transaction("tx/2").unwrap();
    assert_eq!(tx["amount"], 5);

    // Step 4: history filtered by type.
    let history = client.get_transaction_history("sell", "NGN").unwrap();
    let transactions = history["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["id"], "tx/2");

    // Step 5: unknown id.
    let err = client.get_transaction("missing").unwrap_err();
    assert_eq!(err.api_code(), Some("NOT_FOUND"));
}

#[test]
fn unauthenticated_client_is_rejected() {
    let addr = start_mock_server();
    let client = client(addr, "");

    let err = client.create_transaction(&json!({"amount": 10})).unwrap_err();
    assert_eq!(err.api_code(), Some("UNAUTHORIZED"));

    let err = client.get_transaction_history("buy", "NGN").unwrap_err();
    assert_eq!(err.api_code(), Some("UNAUTHORIZED"));
}

#[test]
fn unknown_route_without_envelope_is_decode_error() {
    let addr = start_mock_server();
    // axum answers unknown routes with an empty 404 body.
    let client = FlincapClient::new("test-token").with_base_url(&format!("http://{addr}/nowhere"));

    let err = client.get_exchange().unwrap_err();
    assert!(matches!(err, FlincapError::Decode { .. }));
}

#[test]
fn closed_port_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = FlincapClient::with_config("", &ClientConfig::default())
        .with_base_url(&format!("http://{addr}"));
    let err = client.get_exchange().unwrap_err();
    assert!(matches!(err, FlincapError::Transport(_)));
}

#[test]
fn client_is_shared_across_threads() {
    let addr = start_mock_server();
    let client = std::sync::Arc::new(client(addr, ""));

    let handles: Vec<_> = ["BTC", "ETH", "USDT"]
        .into_iter()
        .map(|crypto| {
            let client = client.clone();
            std::thread::spawn(move || client.get_rate(crypto, "NGN").unwrap())
        })
        .collect();

    for (handle, crypto) in handles.into_iter().zip(["BTC", "ETH", "USDT"]) {
        let rate = handle.join().unwrap();
        assert_eq!(rate["selectedCrypt"], crypto);
    }
}
