//! Bearer token cache and OAuth client-credentials grant.

use std::time::{Duration, Instant};

use mcplink_transport_traits::{TransportError, TransportResult};
use oauth2::basic::{BasicClient, BasicTokenType};
use oauth2::{ClientId, ClientSecret, RequestTokenError, Scope, TokenResponse, TokenUrl};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::OAuthConfig;

/// Tokens are refreshed once they are this close to expiry.
pub(crate) const REFRESH_MARGIN: Duration = Duration::from_secs(30);

const MANUAL_TOKEN_REQUIRED: &str = "manual token required";

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn new(access_token: String, expires_in: Option<Duration>) -> Self {
        Self {
            access_token,
            expires_at: expires_in.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at
            .is_none_or(|at| at.saturating_duration_since(now) > REFRESH_MARGIN)
    }
}

/// Hands out bearer tokens for outgoing requests.
///
/// A cached token is reused until it is within [`REFRESH_MARGIN`] of expiry.
/// After that a new one is fetched when the OAuth configuration allows it;
/// otherwise the caller gets `AuthenticationFailed("manual token required")`
/// rather than a request going out without credentials.
pub(crate) struct TokenManager {
    oauth: Option<OAuthConfig>,
    http_client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("oauth", &self.oauth)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub(crate) fn new(oauth: Option<OAuthConfig>, http_client: reqwest::Client) -> Self {
        Self {
            oauth,
            http_client,
            cached: Mutex::new(None),
        }
    }

    /// Whether tokens can be obtained without the application's help
    pub(crate) fn can_fetch(&self) -> bool {
        self.oauth.as_ref().is_some_and(OAuthConfig::can_fetch_tokens)
    }

    pub(crate) async fn set_token(&self, access_token: String, expires_in: Option<Duration>) {
        *self.cached.lock().await = Some(CachedToken::new(access_token, expires_in));
    }

    pub(crate) async fn clear(&self) {
        self.cached.lock().await.take();
    }

    /// Cached token if it is still fresh; never contacts the token endpoint
    pub(crate) async fn current(&self) -> Option<String> {
        self.cached
            .lock()
            .await
            .as_ref()
            .filter(|token| token.is_fresh(Instant::now()))
            .map(|token| token.access_token.clone())
    }

    /// Token to attach to the next request, `None` when auth is not in use.
    pub(crate) async fn bearer(&self) -> TransportResult<Option<String>> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref()
            && token.is_fresh(Instant::now())
        {
            return Ok(Some(token.access_token.clone()));
        }

        match &self.oauth {
            Some(oauth) if oauth.can_fetch_tokens() => {
                let fresh = self.fetch(oauth).await?;
                let access_token = fresh.access_token.clone();
                *cached = Some(fresh);
                Ok(Some(access_token))
            }
            Some(_) => Err(TransportError::AuthenticationFailed(
                MANUAL_TOKEN_REQUIRED.into(),
            )),
            // An expired token set by hand with no OAuth configuration behind it
            None if cached.is_some() => Err(TransportError::AuthenticationFailed(
                MANUAL_TOKEN_REQUIRED.into(),
            )),
            None => Ok(None),
        }
    }

    async fn fetch(&self, oauth: &OAuthConfig) -> TransportResult<CachedToken> {
        let (Some(token_url), Some(client_secret)) = (&oauth.token_url, &oauth.client_secret)
        else {
            return Err(TransportError::AuthenticationFailed(
                MANUAL_TOKEN_REQUIRED.into(),
            ));
        };

        let token_url = TokenUrl::new(token_url.clone()).map_err(|e| {
            TransportError::ConfigurationError(format!("Invalid token URL '{token_url}': {e}"))
        })?;
        // Client authentication goes in the Authorization: Basic header
        let client = BasicClient::new(ClientId::new(oauth.client_id.clone()))
            .set_client_secret(ClientSecret::new(client_secret.clone()))
            .set_token_uri(token_url);

        debug!(client_id = %oauth.client_id, "Requesting OAuth token");

        let token = client
            .exchange_client_credentials()
            .add_scopes(oauth.scopes.iter().cloned().map(Scope::new))
            .request_async(&self.http_client)
            .await
            .map_err(|e| {
                TransportError::AuthenticationFailed(match e {
                    RequestTokenError::ServerResponse(response) => {
                        format!("Token endpoint rejected the request: {response}")
                    }
                    RequestTokenError::Parse(e, body) => format!(
                        "Invalid token response: {e}: {}",
                        String::from_utf8_lossy(&body)
                    ),
                    other => format!("Token request failed: {other}"),
                })
            })?;

        if *token.token_type() != BasicTokenType::Bearer {
            warn!("Unexpected OAuth token type: {:?}", token.token_type());
        }

        info!(
            expires_in = ?token.expires_in(),
            scopes = ?token.scopes(),
            "Obtained OAuth access token"
        );
        Ok(CachedToken::new(
            token.access_token().secret().clone(),
            token.expires_in(),
        ))
    }
}
