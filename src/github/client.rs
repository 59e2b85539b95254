use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::github::error::{ClientBuildError, GitHubRequestError};
use crate::github::graphql::GraphQLClient;
use crate::github::host::EndpointBundle;
use crate::github::transport::{BearerAuthTransport, HttpTransport, UserAgent, UserAgentTransport};

/// Name this process reports in its user agent
pub const SERVER_NAME: &str = "github-mcp-server";

const GITHUB_JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";
const GITHUB_API_VERSION: &str = "2022-11-28";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// User agent sent before the client has identified itself
pub fn initial_user_agent(version: &str) -> String {
    format!("{}/{}", SERVER_NAME, version)
}

/// User agent sent once the client's handshake has been received
pub fn client_user_agent(version: &str, client_name: &str, client_version: &str) -> String {
    format!(
        "{}/{} ({}/{})",
        SERVER_NAME, version, client_name, client_version
    )
}

/// Sends a request through the transport chain and turns non-success
/// statuses into [`GitHubRequestError::Status`].
pub(crate) async fn send_checked(
    transport: &dyn HttpTransport,
    request: Request,
) -> Result<Response, GitHubRequestError> {
    let method = request.method().clone();
    let url = request.url().to_string();
    debug!("{} {}", method, url);

    let response = transport
        .send(request)
        .await
        .map_err(GitHubRequestError::Transport)?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);

    warn!("GitHub request {} {} failed with {}", method, url, status);
    Err(GitHubRequestError::Status {
        status,
        url,
        message,
    })
}

/// Appends `segments` to `base`, each one percent-encoded as a single path segment.
///
/// Empty, `.` and `..` segments are rejected, and the result must keep the
/// origin and path prefix of `base`, so caller supplied names can never point a
/// request (and the bearer token) at another host or API root.
pub(crate) fn endpoint_url<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, GitHubRequestError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| GitHubRequestError::InvalidPath(base.to_string()))?;
        path.pop_if_empty();
        for segment in segments {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(GitHubRequestError::InvalidPath(segment.to_string()));
            }
            path.push(segment);
        }
    }

    let prefix = base.path().trim_end_matches('/');
    if url.origin() != base.origin() || !url.path().starts_with(prefix) {
        return Err(GitHubRequestError::InvalidPath(url.to_string()));
    }
    Ok(url)
}

/// REST API client bound to the resolved `rest` and `upload` base URLs
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    upload_url: Url,
}

impl RestClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: Url, upload_url: Url) -> Self {
        Self {
            transport,
            base_url,
            upload_url,
        }
    }

    /// GETs the path made of `segments` under the REST base URL and decodes the JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, GitHubRequestError> {
        let request = self.json_request(Method::GET, path)?;
        self.execute_json(request).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, GitHubRequestError> {
        let request = self.json_request_with_body(Method::POST, path, body)?;
        self.execute_json(request).await
    }

    /// Uploads raw bytes to `path` under the upload base URL.
    ///
    /// Used for release assets, which GitHub serves from a separate host.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &[&str],
        query: &[(&str, &str)],
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<T, GitHubRequestError> {
        let mut url = endpoint_url(&self.upload_url, path.iter().copied())?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let mut request = Request::new(Method::POST, url);
        set_github_headers(&mut request);
        let content_type = HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        request.headers_mut().insert(CONTENT_TYPE, content_type);
        *request.body_mut() = Some(bytes.into());
        self.execute_json(request).await
    }

    fn json_request(&self, method: Method, path: &[&str]) -> Result<Request, GitHubRequestError> {
        let url = endpoint_url(&self.base_url, path.iter().copied())?;
        let mut request = Request::new(method, url);
        set_github_headers(&mut request);
        Ok(request)
    }

    fn json_request_with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> Result<Request, GitHubRequestError> {
        let mut request = self.json_request(method, path)?;
        let body = serde_json::to_vec(body)?;
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        *request.body_mut() = Some(body.into());
        Ok(request)
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: Request,
    ) -> Result<T, GitHubRequestError> {
        let response = send_checked(self.transport.as_ref(), request).await?;
        let bytes = response.bytes().await.map_err(GitHubRequestError::Transport)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn set_github_headers(request: &mut Request) {
    let headers = request.headers_mut();
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON_MEDIA_TYPE));
    headers.insert(
        GITHUB_API_VERSION_HEADER,
        HeaderValue::from_static(GITHUB_API_VERSION),
    );
}

/// Raw file content fetched from the raw-content host
#[derive(Debug, Clone)]
pub struct RawContent {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Client for the raw-content host (`raw.githubusercontent.com` on GitHub.com)
#[derive(Clone)]
pub struct RawClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
}

impl RawClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    /// URL of `path` in `owner/repo` at `git_ref`, or `HEAD` when no ref is given.
    ///
    /// `owner` and `repo` are single segments. The ref and the file path may
    /// contain `/`, and each of their pieces becomes its own segment.
    pub fn content_url(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Url, GitHubRequestError> {
        let git_ref = git_ref.filter(|r| !r.is_empty()).unwrap_or("HEAD");
        let segments = [owner, repo]
            .into_iter()
            .chain(git_ref.split('/'))
            .chain(path.trim_start_matches('/').split('/'));
        endpoint_url(&self.base_url, segments)
    }

    pub async fn get_raw_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<RawContent, GitHubRequestError> {
        let url = self.content_url(owner, repo, path, git_ref)?;
        let request = Request::new(Method::GET, url);
        let response = send_checked(self.transport.as_ref(), request).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(GitHubRequestError::Transport)?
            .to_vec();

        Ok(RawContent {
            content_type,
            bytes,
        })
    }
}

/// Every client the tools need, all sharing one transport chain and user agent
#[derive(Clone)]
pub struct GitHubClients {
    pub rest: RestClient,
    pub graphql: GraphQLClient,
    pub raw: RawClient,
    pub user_agent: UserAgent,
}

/// Builds the REST, GraphQL and raw-content clients for `endpoints`.
///
/// No network I/O happens here. The returned [`UserAgent`] starts out as
/// `github-mcp-server/<version>` and is updated by the handshake hook.
pub fn build_clients(
    endpoints: &EndpointBundle,
    token: &str,
    version: &str,
) -> Result<GitHubClients, ClientBuildError> {
    let base = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    build_clients_with_transport(endpoints, token, version, base)
}

/// Same as [`build_clients`] but over a caller supplied base transport
pub fn build_clients_with_transport<T>(
    endpoints: &EndpointBundle,
    token: &str,
    version: &str,
    base: T,
) -> Result<GitHubClients, ClientBuildError>
where
    T: HttpTransport + 'static,
{
    let user_agent = UserAgent::new(&initial_user_agent(version))?;
    let chain: Arc<dyn HttpTransport> = Arc::new(UserAgentTransport::new(
        user_agent.clone(),
        BearerAuthTransport::new(token, base)?,
    ));

    Ok(GitHubClients {
        rest: RestClient::new(
            chain.clone(),
            endpoints.rest.clone(),
            endpoints.upload.clone(),
        ),
        graphql: GraphQLClient::new(chain.clone(), endpoints.graphql.clone()),
        raw: RawClient::new(chain, endpoints.raw_content.clone()),
        user_agent,
    })
}
