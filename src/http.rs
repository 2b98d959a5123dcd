use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use tracing::debug;

use crate::errors::{ChatStreamError, TransportError};
use crate::request::ChatRequest;
use crate::transport::{ByteStream, Transport};

/// Supplies the bearer token for outgoing requests.
///
/// Token acquisition and storage live with the caller's auth layer; the
/// transport only asks for the current token at send time.
pub trait TokenSource: Send + Sync {
    /// Returns the current bearer token, if one is available.
    fn bearer_token(&self) -> Option<String>;
}

/// Token source for unauthenticated or anonymous sessions.
pub struct NoToken;

impl TokenSource for NoToken {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Token source wrapping a fixed token string.
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Configuration for the HTTP chat transport.
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Base URL of the assistant backend.
    pub base_url: String,
    /// Path of the streaming chat endpoint.
    pub chat_path: String,
    /// Optional overall request timeout.
    ///
    /// `None` by default: the streaming subsystem enforces no timeout of its
    /// own and leaves that policy to the caller's cancellation.
    pub timeout: Option<Duration>,
}

impl HttpTransportConfig {
    /// Creates a config with the default chat endpoint path.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            chat_path: "/api/chat/stream".to_string(),
            timeout: None,
        }
    }

    /// Overrides the streaming endpoint path.
    pub fn chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    /// Sets an overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn chat_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.chat_path.trim_start_matches('/')
        )
    }
}

/// reqwest-backed [`Transport`] for the assistant backend.
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpTransportConfig,
    tokens: Arc<dyn TokenSource>,
}

impl HttpTransport {
    /// Creates a transport from explicit configuration and a token source.
    pub fn new(
        config: HttpTransportConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ChatStreamError> {
        if config.base_url.trim().is_empty() {
            return Err(ChatStreamError::Config(
                "transport base_url must not be empty".into(),
            ));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ChatStreamError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            tokens,
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, TransportError> {
        debug!(session_id = %request.session_id, "opening chat stream");
        let mut http_req = self.client.post(self.config.chat_url()).json(request);
        if let Some(token) = self.tokens.bearer_token() {
            http_req = http_req.bearer_auth(token);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| TransportError::request(format!("chat request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::http(status.as_u16(), body));
        }

        Ok(Box::pin(response.bytes_stream().map(|result| {
            result.map_err(|e| TransportError::read(format!("chat stream read failed: {e}")))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_url_joins_base_and_path_cleanly() {
        let config = HttpTransportConfig::new("https://api.example.com/");
        assert_eq!(config.chat_url(), "https://api.example.com/api/chat/stream");

        let config = HttpTransportConfig::new("https://api.example.com").chat_path("chat");
        assert_eq!(config.chat_url(), "https://api.example.com/chat");
    }

    #[test]
    fn empty_base_url_is_a_config_error() {
        let result = HttpTransport::new(HttpTransportConfig::new("  "), Arc::new(NoToken));
        assert!(matches!(result, Err(ChatStreamError::Config(_))));
    }

    #[test]
    fn token_sources_report_their_tokens() {
        assert_eq!(NoToken.bearer_token(), None);
        assert_eq!(
            StaticToken("abc".into()).bearer_token(),
            Some("abc".to_string())
        );
    }
}
