//! HTTP POST client transport.
//!
//! Every outgoing message is one POST to the configured endpoint. Whatever
//! the server sends back in the response body (a single message, a batch
//! array, or an SSE stream of messages) is appended to a FIFO queue that
//! `receive` drains, polling while it is empty.

use std::collections::VecDeque;
use std::time::Duration;

use futures::StreamExt;
use mcplink_protocol::Message;
use mcplink_transport_traits::{
    AtomicMetrics, Transport, TransportError, TransportFuture, TransportMetrics, TransportResult,
    TransportState, TransportType,
};
use parking_lot::Mutex;
use reqwest::{Client as HttpClient, StatusCode, header};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::auth::TokenManager;
use crate::config::HttpTransportConfig;
use crate::sse::SseDecoder;

const ACCEPT_BOTH: &str = "application/json, text/event-stream";
const SESSION_HEADER: &str = "Mcp-Session-Id";
const PROTOCOL_VERSION_HEADER: &str = "MCP-Protocol-Version";

/// HTTP client transport
pub struct HttpTransport {
    config: HttpTransportConfig,
    endpoint: Url,
    http_client: HttpClient,
    custom_headers: header::HeaderMap,
    state: Mutex<TransportState>,
    session_id: Mutex<Option<String>>,
    queue: Mutex<VecDeque<Message>>,
    tokens: TokenManager,
    metrics: AtomicMetrics,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("state", &*self.state.lock())
            .field("session_id", &*self.session_id.lock())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport for `config`.
    ///
    /// Fails with `ConfigurationError` for an unparsable URL or header, or
    /// when the HTTP client cannot be built.
    pub fn new(config: HttpTransportConfig) -> TransportResult<Self> {
        let endpoint = Url::parse(&config.base_url).map_err(|e| {
            TransportError::ConfigurationError(format!(
                "Invalid base URL '{}': {e}",
                config.base_url
            ))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(TransportError::ConfigurationError(format!(
                "Unsupported URL scheme '{}'",
                endpoint.scheme()
            )));
        }

        let mut custom_headers = header::HeaderMap::new();
        for (name, value) in &config.headers {
            let name = header::HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                TransportError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
            })?;
            let value = header::HeaderValue::from_str(value).map_err(|e| {
                TransportError::ConfigurationError(format!(
                    "Invalid value for header '{name}': {e}"
                ))
            })?;
            custom_headers.insert(name, value);
        }

        let mut client_builder = HttpClient::builder().timeout(config.timeout);
        if let Some(ref user_agent) = config.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        }
        let http_client = client_builder.build().map_err(|e| {
            TransportError::ConfigurationError(format!("Failed to build HTTP client: {e}"))
        })?;

        // Token requests never follow redirects
        let token_client = HttpClient::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                TransportError::ConfigurationError(format!("Failed to build token client: {e}"))
            })?;
        let tokens = TokenManager::new(config.oauth.clone(), token_client);

        Ok(Self {
            config,
            endpoint,
            http_client,
            custom_headers,
            state: Mutex::new(TransportState::Disconnected),
            session_id: Mutex::new(None),
            queue: Mutex::new(VecDeque::new()),
            tokens,
            metrics: AtomicMetrics::new(),
        })
    }

    /// Supply a bearer token obtained outside the transport.
    ///
    /// `expires_in` of `None` means the token never expires.
    ///
    /// ```rust
    /// use mcplink_http::{HttpTransport, HttpTransportConfig, OAuthConfig};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let config = HttpTransportConfig::new("http://localhost:8080/mcp")
    ///     .with_oauth(OAuthConfig::manual("desktop-app"));
    /// let transport = HttpTransport::new(config)?;
    /// transport
    ///     .set_access_token("eyJhbGciOi...", Some(Duration::from_secs(3600)))
    ///     .await;
    /// # Ok::<_, mcplink_transport_traits::TransportError>(())
    /// # }).unwrap();
    /// ```
    pub async fn set_access_token(&self, token: impl Into<String>, expires_in: Option<Duration>) {
        self.tokens.set_token(token.into(), expires_in).await;
    }

    /// Session id issued by the server, if any
    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().clone()
    }

    /// Number of received messages not yet returned by `receive`
    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    fn set_state(&self, state: TransportState) {
        *self.state.lock() = state;
    }

    fn build_headers(&self, bearer: Option<&str>) -> header::HeaderMap {
        let mut headers = self.custom_headers.clone();

        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT_BOTH));
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if let Ok(protocol_value) = header::HeaderValue::from_str(&self.config.protocol_version) {
            headers.insert(PROTOCOL_VERSION_HEADER, protocol_value);
        }

        let session_id = self.session_id.lock().clone();
        if let Some(session_id) = session_id
            && let Ok(session_value) = header::HeaderValue::from_str(&session_id)
        {
            headers.insert(SESSION_HEADER, session_value);
        }

        if let Some(token) = bearer
            && let Ok(auth_value) = header::HeaderValue::from_str(&format!("Bearer {token}"))
        {
            headers.insert(header::AUTHORIZATION, auth_value);
        }

        headers
    }

    fn capture_session(&self, response: &reqwest::Response) {
        if let Some(session_id) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            let mut current = self.session_id.lock();
            if current.as_deref() != Some(session_id) {
                info!("Received session ID: {}", session_id);
                *current = Some(session_id.to_string());
            }
        }
    }

    async fn enqueue_response(&self, response: reqwest::Response) -> TransportResult<()> {
        if response.status() == StatusCode::ACCEPTED {
            debug!("Received HTTP 202 Accepted (no response body expected)");
            return Ok(());
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.contains("text/event-stream") {
            debug!("Received SSE stream response from POST, processing events");
            let mut decoder = SseDecoder::default();
            let mut stream = response.bytes_stream();

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
                for data in decoder.push(&chunk) {
                    if let Err(e) = self.enqueue_payload(data.as_bytes()) {
                        warn!("Failed to process POST SSE event: {}", e);
                    }
                }
            }
            if let Some(data) = decoder.finish()
                && let Err(e) = self.enqueue_payload(data.as_bytes())
            {
                warn!("Failed to process POST SSE event: {}", e);
            }
            Ok(())
        } else {
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
            self.enqueue_payload(&body).map(|_| ())
        }
    }

    fn enqueue_payload(&self, payload: &[u8]) -> TransportResult<usize> {
        let messages = decode_body(payload)?;
        let count = messages.len();
        if count == 0 {
            return Ok(0);
        }

        let share = payload.len() / count;
        let mut queue = self.queue.lock();
        for message in messages {
            self.metrics.record_received(share);
            queue.push_back(message);
        }
        trace!("Queued {} message(s) from HTTP response", count);
        Ok(count)
    }

    async fn terminate_session(&self, session_id: &str) {
        let Ok(session_value) = header::HeaderValue::from_str(session_id) else {
            return;
        };
        let mut request = self
            .http_client
            .delete(self.endpoint.clone())
            .headers(self.custom_headers.clone())
            .header(SESSION_HEADER, session_value);
        // Never fetch a new token just to say goodbye
        if let Some(token) = self.tokens.current().await {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => debug!("Session terminated: {}", response.status()),
            Err(e) => debug!("Session termination failed: {}", e),
        }
    }
}

/// Decode a JSON response body holding one message or a batch array.
fn decode_body(payload: &[u8]) -> TransportResult<Vec<Message>> {
    let trimmed = payload.trim_ascii();
    match trimmed.first() {
        None => Ok(Vec::new()),
        Some(b'[') => serde_json::from_slice(trimmed).map_err(TransportError::from),
        Some(_) => serde_json::from_slice::<Message>(trimmed)
            .map(|message| vec![message])
            .map_err(TransportError::from),
    }
}

impl Transport for HttpTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Http
    }

    fn state(&self) -> TransportState {
        self.state.lock().clone()
    }

    fn connect(&self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            {
                let mut state = self.state.lock();
                if matches!(
                    *state,
                    TransportState::Connected | TransportState::Connecting
                ) {
                    return Err(TransportError::AlreadyConnected);
                }
                *state = TransportState::Connecting;
            }

            info!("Connecting HTTP transport to {}", self.endpoint);

            if self.tokens.can_fetch()
                && let Err(e) = self.tokens.bearer().await
            {
                self.metrics.record_connection(false);
                self.set_state(TransportState::Failed {
                    reason: e.to_string(),
                });
                return Err(e);
            }

            self.metrics.record_connection(true);
            self.set_state(TransportState::Connected);
            Ok(())
        })
    }

    fn send(&self, message: Message) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }

            let body = message
                .to_json()
                .map_err(|e| TransportError::SerializationFailed(e.to_string()))?;
            let bearer = self.tokens.bearer().await?;
            let headers = self.build_headers(bearer.as_deref());

            debug!(message = %message, "Sending message via HTTP POST");
            let body_len = body.len();
            let response = self
                .http_client
                .post(self.endpoint.clone())
                .headers(headers)
                .body(body)
                .send()
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            self.capture_session(&response);

            let status = response.status();
            if !status.is_success() {
                if status == StatusCode::UNAUTHORIZED {
                    // Force a fresh token on the next request
                    self.tokens.clear().await;
                }
                let body = response.text().await.unwrap_or_default();
                return Err(TransportError::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            self.metrics.record_sent(body_len);
            self.enqueue_response(response).await
        })
    }

    fn receive(&self) -> TransportFuture<'_, Option<Message>> {
        Box::pin(async move {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }

            loop {
                let next = self.queue.lock().pop_front();
                if let Some(message) = next {
                    return Ok(Some(message));
                }
                if !self.is_connected() {
                    return Ok(None);
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        })
    }

    fn close(&self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let was_connected = self.is_connected();
            self.set_state(TransportState::Disconnecting);

            let session_id = self.session_id.lock().take();
            if was_connected && let Some(session_id) = session_id {
                self.terminate_session(&session_id).await;
            }

            self.queue.lock().clear();
            self.tokens.clear().await;
            self.set_state(TransportState::Disconnected);
            info!("HTTP transport closed");
            Ok(())
        })
    }

    fn metrics(&self) -> TransportMetrics {
        self.metrics.snapshot()
    }

    fn endpoint(&self) -> Option<String> {
        Some(self.endpoint.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_single_and_batch() {
        let single = decode_body(br#"  {"jsonrpc":"2.0","id":1,"result":{}} "#).unwrap();
        assert_eq!(single.len(), 1);
        assert!(single[0].is_response());

        let batch = decode_body(
            br#"[{"jsonrpc":"2.0","id":1,"result":{}},{"jsonrpc":"2.0","method":"notifications/message"}]"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch[1].is_notification());

        assert!(decode_body(b"   ").unwrap().is_empty());
        assert!(matches!(
            decode_body(b"<html>"),
            Err(TransportError::SerializationFailed(_))
        ));
    }

    #[test]
    fn test_invalid_configuration() {
        let err = HttpTransport::new(HttpTransportConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, TransportError::ConfigurationError(_)));

        let err = HttpTransport::new(HttpTransportConfig::new("ftp://example.com")).unwrap_err();
        assert!(matches!(err, TransportError::ConfigurationError(_)));

        let err = HttpTransport::new(
            HttpTransportConfig::new("http://localhost/mcp").with_header("bad header", "x"),
        )
        .unwrap_err();
        assert!(matches!(err, TransportError::ConfigurationError(_)));
    }

    #[test]
    fn test_headers() {
        let transport = HttpTransport::new(
            HttpTransportConfig::new("http://localhost/mcp").with_header("X-Api-Key", "k"),
        )
        .unwrap();
        *transport.session_id.lock() = Some("abc".into());

        let headers = transport.build_headers(Some("tok"));
        assert_eq!(headers[header::ACCEPT], ACCEPT_BOTH);
        assert_eq!(headers[header::AUTHORIZATION], "Bearer tok");
        assert_eq!(headers[SESSION_HEADER], "abc");
        assert_eq!(headers[PROTOCOL_VERSION_HEADER], "2025-06-18");
        assert_eq!(headers["x-api-key"], "k");

        let anonymous = transport.build_headers(None);
        assert!(anonymous.get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let transport = HttpTransport::new(HttpTransportConfig::default()).unwrap();
        assert_eq!(transport.transport_type(), TransportType::Http);
        assert!(matches!(
            transport.receive().await,
            Err(TransportError::NotConnected)
        ));
        let msg = Message::notification("notifications/initialized", None::<()>).unwrap();
        assert!(matches!(
            transport.send(msg).await,
            Err(TransportError::NotConnected)
        ));
    }
}
