//! Outbound HTTP transport chain shared by every GitHub client
//!
//! Requests flow through `UserAgentTransport -> BearerAuthTransport -> reqwest::Client`.
//! The bearer decorator sits closest to the wire so it sees the final request,
//! including headers added by the upload path.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue, USER_AGENT};
use reqwest::{Request, Response};

use crate::github::error::ClientBuildError;

/// Something that can send a fully built HTTP request
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn send(&self, request: Request) -> reqwest::Result<Response> {
        self.execute(request).await
    }
}

/// Sets `Authorization: Bearer <token>` on every request.
pub struct BearerAuthTransport<T> {
    authorization: HeaderValue,
    inner: T,
}

impl<T: HttpTransport> BearerAuthTransport<T> {
    pub fn new(token: &str, inner: T) -> Result<Self, ClientBuildError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientBuildError::InvalidToken)?;
        authorization.set_sensitive(true);
        Ok(Self {
            authorization,
            inner,
        })
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for BearerAuthTransport<T> {
    async fn send(&self, mut request: Request) -> reqwest::Result<Response> {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.authorization.clone());
        self.inner.send(request).await
    }
}

/// Mutable user-agent cell shared by every client.
///
/// Written once at handshake, read by every outbound request. Clones share the
/// same underlying value.
#[derive(Clone, Debug)]
pub struct UserAgent {
    value: Arc<RwLock<HeaderValue>>,
}

impl UserAgent {
    pub fn new(value: &str) -> Result<Self, ClientBuildError> {
        let header = parse_user_agent(value)?;
        Ok(Self {
            value: Arc::new(RwLock::new(header)),
        })
    }

    /// Replaces the value seen by all subsequent requests
    pub fn set(&self, value: &str) -> Result<(), ClientBuildError> {
        let header = parse_user_agent(value)?;
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = header;
        Ok(())
    }

    pub fn header_value(&self) -> HeaderValue {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current value as a string
    pub fn get(&self) -> String {
        String::from_utf8_lossy(self.header_value().as_bytes()).into_owned()
    }
}

fn parse_user_agent(value: &str) -> Result<HeaderValue, ClientBuildError> {
    HeaderValue::from_str(value).map_err(|_| ClientBuildError::InvalidUserAgent(value.to_string()))
}

/// Sets the `User-Agent` header from the shared [`UserAgent`] cell.
pub struct UserAgentTransport<T> {
    user_agent: UserAgent,
    inner: T,
}

impl<T: HttpTransport> UserAgentTransport<T> {
    pub fn new(user_agent: UserAgent, inner: T) -> Self {
        Self { user_agent, inner }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for UserAgentTransport<T> {
    async fn send(&self, mut request: Request) -> reqwest::Result<Response> {
        request
            .headers_mut()
            .insert(USER_AGENT, self.user_agent.header_value());
        self.inner.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_clones_share_value() {
        let agent = UserAgent::new("github-mcp-server/1.0.0").unwrap();
        let shared = agent.clone();

        agent
            .set("github-mcp-server/1.0.0 (acme-editor/2.1)")
            .unwrap();

        assert_eq!(shared.get(), "github-mcp-server/1.0.0 (acme-editor/2.1)");
    }

    #[test]
    fn invalid_user_agent_keeps_previous_value() {
        let agent = UserAgent::new("github-mcp-server/1.0.0").unwrap();

        assert!(agent.set("bad\nvalue").is_err());
        assert_eq!(agent.get(), "github-mcp-server/1.0.0");
    }

    #[test]
    fn bearer_token_with_newline_is_rejected() {
        let result = BearerAuthTransport::new("tok\nen", reqwest::Client::new());
        assert!(matches!(result, Err(ClientBuildError::InvalidToken)));
    }
}
