//! HTTP transport configuration.

use std::collections::HashMap;
use std::time::Duration;

use mcplink_protocol::LATEST_PROTOCOL_VERSION;
use serde::{Deserialize, Serialize};

/// OAuth 2.0 client credentials.
///
/// With both `token_url` and `client_secret` present the transport fetches
/// and refreshes tokens itself using the client-credentials grant. Without
/// them, a token must be supplied through
/// [`HttpTransport::set_access_token`](crate::HttpTransport::set_access_token).
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Token endpoint
    pub token_url: Option<String>,
    /// Client identifier
    pub client_id: String,
    /// Client secret
    pub client_secret: Option<String>,
    /// Requested scopes, sent space separated
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl OAuthConfig {
    /// Credentials for the client-credentials grant
    pub fn client_credentials(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: Some(token_url.into()),
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            scopes: Vec::new(),
        }
    }

    /// Identity only; tokens are supplied by the application
    pub fn manual(client_id: impl Into<String>) -> Self {
        Self {
            token_url: None,
            client_id: client_id.into(),
            client_secret: None,
            scopes: Vec::new(),
        }
    }

    /// Set requested scopes
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the transport can obtain tokens on its own
    pub fn can_fetch_tokens(&self) -> bool {
        self.token_url.is_some() && self.client_secret.is_some()
    }
}

/// HTTP transport configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpTransportConfig {
    /// Endpoint every message is POSTed to (e.g., <https://api.example.com/mcp>)
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// OAuth credentials; when set, no request is sent without a bearer token
    pub oauth: Option<OAuthConfig>,

    /// Extra headers added to every request
    pub headers: HashMap<String, String>,

    /// User agent string (set to None to disable User-Agent header)
    pub user_agent: Option<String>,

    /// Value of the `MCP-Protocol-Version` header
    pub protocol_version: String,

    /// How long `receive` sleeps between checks of an empty queue
    pub poll_interval: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/mcp".to_string(),
            timeout: Duration::from_secs(30),
            oauth: None,
            headers: HashMap::new(),
            user_agent: Some(format!("mcplink/{}", env!("CARGO_PKG_VERSION"))),
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl HttpTransportConfig {
    /// Configuration targeting `base_url` with defaults elsewhere
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable OAuth
    pub fn with_oauth(mut self, oauth: OAuthConfig) -> Self {
        self.oauth = Some(oauth);
        self
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set or clear the user agent
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Set the protocol version header value
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    /// Set the receive poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
