//! Scripted MCP server on the far end of an in-memory transport.

#![allow(dead_code)]

use std::time::Duration;

use mcplink_client::{Client, ClientBuilder, Message, RequestId};
use mcplink_transport_traits::{MemoryTransport, Transport};
use serde_json::{Value, json};

/// How long a test waits for a message before failing
pub const STEP: Duration = Duration::from_secs(5);

/// The server side of a [`MemoryTransport`] pair
#[derive(Debug)]
pub struct ScriptedServer {
    transport: MemoryTransport,
}

impl ScriptedServer {
    /// Next message from the client; panics on end of stream or timeout
    pub async fn next(&self) -> Message {
        tokio::time::timeout(STEP, self.transport.receive())
            .await
            .expect("client sent nothing")
            .expect("server receive failed")
            .expect("client closed the channel")
    }

    /// Next message, `None` once the client has closed its end
    pub async fn next_or_eof(&self) -> Option<Message> {
        tokio::time::timeout(STEP, self.transport.receive())
            .await
            .expect("client sent nothing")
            .expect("server receive failed")
    }

    /// Next message, asserting it is a request for `method`
    pub async fn expect_request(&self, method: &str) -> Message {
        let message = self.next().await;
        assert!(message.is_request(), "expected request, got {message}");
        assert_eq!(message.method_name(), method);
        message
    }

    pub async fn send(&self, message: Message) {
        self.transport.send(message).await.expect("server send failed");
    }

    pub async fn send_raw(&self, raw: &str) {
        self.send(Message::parse(raw).expect("fixture is valid JSON")).await;
    }

    pub async fn reply(&self, request: &Message, result: Value) {
        let id = request.id.clone().expect("request has an id");
        self.send(Message::success_response(id, &result).unwrap()).await;
    }

    pub async fn reply_error(&self, request: &Message, code: i32, message: &str) {
        let id = request.id.clone().expect("request has an id");
        self.send(Message::error_response(id, code, message, None)).await;
    }

    pub async fn notify(&self, method: &str, params: Value) {
        self.send(Message::notification(method, Some(params)).unwrap())
            .await;
    }

    /// Answer `initialize` as the `demo` server and consume `initialized`
    pub async fn handshake(&self) -> Message {
        let initialize = self.expect_request("initialize").await;
        self.reply(&initialize, demo_initialize_result()).await;

        let initialized = self.next().await;
        assert!(initialized.is_notification());
        assert_eq!(initialized.method_name(), "notifications/initialized");
        initialize
    }

    pub async fn close(&self) {
        self.transport.close().await.unwrap();
    }
}

pub fn demo_initialize_result() -> Value {
    json!({
        "protocolVersion": "2025-06-18",
        "capabilities": {
            "tools": {"listChanged": false},
            "resources": {"subscribe": false, "listChanged": false},
            "prompts": {"listChanged": true},
            "logging": {}
        },
        "serverInfo": {"name": "demo", "version": "1.0.0"},
        "instructions": "Use search for lookups"
    })
}

/// Route client logs to the test harness; `RUST_LOG=mcplink_client=trace` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh, unconnected client and the server it will talk to
pub async fn pair_with(builder: ClientBuilder) -> (Client<MemoryTransport>, ScriptedServer) {
    init_tracing();
    let (client_end, server_end) = MemoryTransport::pair();
    server_end.connect().await.unwrap();
    (
        builder.build(client_end),
        ScriptedServer {
            transport: server_end,
        },
    )
}

/// A client that has completed the handshake with the `demo` server
pub async fn connected() -> (Client<MemoryTransport>, ScriptedServer) {
    connected_with(ClientBuilder::new()).await
}

pub async fn connected_with(builder: ClientBuilder) -> (Client<MemoryTransport>, ScriptedServer) {
    let (client, server) = pair_with(builder).await;
    let (result, _) = tokio::join!(client.connect(), server.handshake());
    result.expect("handshake failed");
    (client, server)
}

/// Poll until `client` has `n` calls in flight
pub async fn wait_for_pending(client: &Client<MemoryTransport>, n: usize) {
    tokio::time::timeout(STEP, async {
        while client.pending_requests() != n {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("calls never became pending");
}

pub fn number(id: &Option<RequestId>) -> i64 {
    match id {
        Some(RequestId::Number(n)) => *n,
        other => panic!("expected numeric id, got {other:?}"),
    }
}
