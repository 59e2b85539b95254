pub mod repository;

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::github::client::send_checked;
use crate::github::error::{GitHubRequestError, GraphQLRequestError};
use crate::github::transport::HttpTransport;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLQuery(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLPayload<T: serde::Serialize> {
    pub query: GraphQLQuery,
    pub variables: Option<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

/// GraphQL client posting to an absolute endpoint URL.
///
/// The endpoint is taken as-is for every topology, so GitHub.com and
/// enterprise hosts share one construction path.
#[derive(Clone)]
pub struct GraphQLClient {
    transport: Arc<dyn HttpTransport>,
    endpoint: Url,
}

impl GraphQLClient {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: Url) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Executes `query` with `variables` and returns the decoded `data` field.
    ///
    /// Errors reported in the response body are returned as
    /// [`GraphQLRequestError::Query`] even when partial data is present.
    pub async fn execute<V: Serialize, R: DeserializeOwned>(
        &self,
        query_name: &str,
        payload: GraphQLPayload<V>,
    ) -> Result<R, GraphQLRequestError> {
        let body = serde_json::to_vec(&payload)
            .map_err(|e| GraphQLRequestError::Request(GitHubRequestError::Decode(e)))?;

        let mut request = Request::new(Method::POST, self.endpoint.clone());
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(body.into());

        tracing::debug!("Executing GraphQL query '{}'", query_name);
        let response = send_checked(self.transport.as_ref(), request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GraphQLRequestError::Request(GitHubRequestError::Transport(e)))?;

        let response: GraphQLResponse<R> =
            serde_json::from_slice(&bytes).map_err(GraphQLRequestError::Decode)?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            tracing::warn!(
                "GraphQL query '{}' returned {} error(s)",
                query_name,
                errors.len()
            );
            return Err(GraphQLRequestError::Query(errors));
        }

        response.data.ok_or(GraphQLRequestError::MissingData)
    }
}
