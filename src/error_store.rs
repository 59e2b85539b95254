//! Per-request store of GitHub API failures
//!
//! Tool handlers record user-actionable REST and GraphQL failures here while
//! still returning an ordinary failed tool result to the client. Code that runs
//! after the handler (logging, response inspection) reads them back without the
//! handler having to return them.
//!
//! The store is carried in a task-local slot installed by [`with_github_errors`].
//! rmcp runs every request on its own task, so a slot installed around the run
//! loop is not visible to handlers; the per-request hook installs a fresh one.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::StatusCode;
use thiserror::Error;

use crate::github::error::{GitHubRequestError, GraphQLRequestError};

tokio::task_local! {
    static GITHUB_ERRORS: ErrorStore;
}

/// Details of the HTTP response a REST failure came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDetails {
    pub status: StatusCode,
    pub url: String,
}

/// A failed GitHub REST API call
#[derive(Debug, Clone, Error)]
#[error("{message}: {cause}")]
pub struct GitHubApiError {
    pub message: String,
    pub cause: Arc<GitHubRequestError>,
    pub response: Option<ResponseDetails>,
}

impl GitHubApiError {
    pub fn new(message: impl Into<String>, cause: GitHubRequestError) -> Self {
        let response = match &cause {
            GitHubRequestError::Status { status, url, .. } => Some(ResponseDetails {
                status: *status,
                url: url.clone(),
            }),
            _ => None,
        };
        Self {
            message: message.into(),
            cause: Arc::new(cause),
            response,
        }
    }
}

/// A failed GitHub GraphQL API call
#[derive(Debug, Clone, Error)]
#[error("{message}: {cause}")]
pub struct GitHubGraphQLError {
    pub message: String,
    pub cause: Arc<GraphQLRequestError>,
}

impl GitHubGraphQLError {
    pub fn new(message: impl Into<String>, cause: GraphQLRequestError) -> Self {
        Self {
            message: message.into(),
            cause: Arc::new(cause),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ErrorStoreError {
    #[error("no GitHub error store in the current request scope")]
    Missing,
}

#[derive(Debug, Default)]
struct RecordedErrors {
    api: Vec<GitHubApiError>,
    graphql: Vec<GitHubGraphQLError>,
}

/// Handle to one request's recorded failures. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct ErrorStore {
    inner: Arc<Mutex<RecordedErrors>>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RecordedErrors> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_api_error(&self, error: GitHubApiError) {
        self.lock().api.push(error);
    }

    pub fn record_graphql_error(&self, error: GitHubGraphQLError) {
        self.lock().graphql.push(error);
    }

    /// REST failures in the order they were recorded
    pub fn api_errors(&self) -> Vec<GitHubApiError> {
        self.lock().api.clone()
    }

    /// GraphQL failures in the order they were recorded
    pub fn graphql_errors(&self) -> Vec<GitHubGraphQLError> {
        self.lock().graphql.clone()
    }

    pub fn is_empty(&self) -> bool {
        let recorded = self.lock();
        recorded.api.is_empty() && recorded.graphql.is_empty()
    }
}

/// Runs `future` with `store` as the current request's error store.
pub async fn with_github_errors<F: Future>(store: ErrorStore, future: F) -> F::Output {
    GITHUB_ERRORS.scope(store, future).await
}

/// The store in scope for the current task, if any
pub fn current_store() -> Option<ErrorStore> {
    GITHUB_ERRORS.try_with(ErrorStore::clone).ok()
}

/// Records a REST failure in the current request's store.
///
/// Never fails: without a store in scope the error is only logged.
pub fn record_github_api_error(error: GitHubApiError) {
    let description = error.to_string();
    if GITHUB_ERRORS
        .try_with(|store| store.record_api_error(error))
        .is_err()
    {
        tracing::warn!(
            "No GitHub error store in scope, dropping API error: {}",
            description
        );
    }
}

/// Records a GraphQL failure in the current request's store.
///
/// Never fails: without a store in scope the error is only logged.
pub fn record_github_graphql_error(error: GitHubGraphQLError) {
    let description = error.to_string();
    if GITHUB_ERRORS
        .try_with(|store| store.record_graphql_error(error))
        .is_err()
    {
        tracing::warn!(
            "No GitHub error store in scope, dropping GraphQL error: {}",
            description
        );
    }
}

pub fn github_api_errors() -> Result<Vec<GitHubApiError>, ErrorStoreError> {
    GITHUB_ERRORS
        .try_with(ErrorStore::api_errors)
        .map_err(|_| ErrorStoreError::Missing)
}

pub fn github_graphql_errors() -> Result<Vec<GitHubGraphQLError>, ErrorStoreError> {
    GITHUB_ERRORS
        .try_with(ErrorStore::graphql_errors)
        .map_err(|_| ErrorStoreError::Missing)
}
