use reqwest::StatusCode;
use thiserror::Error;

use crate::github::graphql::GraphQLError;

/// The configured GitHub host could not be turned into API endpoints.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid host configuration '{host}': {reason}")]
    InvalidHostConfiguration { host: String, reason: String },
}

impl HostError {
    pub(crate) fn invalid(host: &str, reason: impl Into<String>) -> Self {
        Self::InvalidHostConfiguration {
            host: host.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures while assembling the shared transport chain and API clients
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("personal access token is not a valid header value")]
    InvalidToken,

    #[error("user agent '{0}' is not a valid header value")]
    InvalidUserAgent(String),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Errors returned by the REST and raw content clients.
#[derive(Debug, Error)]
pub enum GitHubRequestError {
    /// The request never produced a response (DNS, TLS, connection reset, timeout)
    #[error("request to GitHub failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// GitHub answered with a non-success status
    #[error("GitHub returned {status} for {url}: {message}")]
    Status {
        status: StatusCode,
        url: String,
        message: String,
    },

    #[error("failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to build request URL: {0}")]
    Url(#[from] url::ParseError),

    /// A caller supplied path segment would leave the resolved API endpoint
    #[error("invalid request path segment '{0}'")]
    InvalidPath(String),
}

impl GitHubRequestError {
    /// Whether the failure is something the caller can act on (bad credentials,
    /// rate limiting, missing resources, unreachable host) as opposed to a bug
    /// in this process.
    pub fn is_user_actionable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// HTTP status of the failed response, if GitHub answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}

/// Errors returned by the GraphQL client.
#[derive(Debug, Error)]
pub enum GraphQLRequestError {
    #[error(transparent)]
    Request(#[from] GitHubRequestError),

    /// GitHub executed the query and reported errors in the response body
    #[error("GraphQL query failed: {}", join_messages(.0))]
    Query(Vec<GraphQLError>),

    #[error("GraphQL response contained no data")]
    MissingData,

    #[error("failed to decode GraphQL response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl GraphQLRequestError {
    pub fn is_user_actionable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_user_actionable(),
            Self::Query(_) => true,
            Self::MissingData | Self::Decode(_) => false,
        }
    }
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
