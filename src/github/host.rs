//! Host resolution for the supported GitHub deployment topologies
//!
//! A single user supplied host string decides which GitHub deployment the
//! server talks to and therefore the shape of every API URL:
//!
//! - empty or `*github.com` hosts resolve to the public GitHub.com endpoints
//! - `*ghe.com` hosts resolve to GitHub Enterprise Cloud with data residency
//! - anything else is treated as a self-hosted GitHub Enterprise Server

use url::Url;

use crate::github::error::HostError;

const DOTCOM_REST_URL: &str = "https://api.github.com/";
const DOTCOM_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const DOTCOM_UPLOAD_URL: &str = "https://uploads.github.com";
const DOTCOM_RAW_URL: &str = "https://raw.githubusercontent.com/";

/// Deployment model of the target GitHub instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topology {
    /// Public GitHub.com
    Dotcom,
    /// GitHub Enterprise Cloud with data residency (`*.ghe.com`), always served over https
    EnterpriseCloud { hostname: String },
    /// Self-hosted GitHub Enterprise Server, keeping the scheme the user supplied
    EnterpriseServer { scheme: String, hostname: String },
}

/// The four base URLs every outbound GitHub request is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointBundle {
    pub topology: Topology,
    pub rest: Url,
    pub graphql: Url,
    pub upload: Url,
    pub raw_content: Url,
}

impl Topology {
    /// Classifies a host string into a topology.
    ///
    /// The empty string is the GitHub.com default. Any other value must be an
    /// absolute URL with an explicit scheme; `github.example.com` is rejected
    /// rather than silently defaulted to https.
    pub fn from_host(host: &str) -> Result<Self, HostError> {
        if host.is_empty() {
            return Ok(Self::Dotcom);
        }

        let parsed = Url::parse(host).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => {
                HostError::invalid(host, "host must have a scheme (http or https)")
            }
            other => HostError::invalid(host, format!("failed to parse host URL: {}", other)),
        })?;

        // Url::host_str never includes the port, so ports on enterprise hosts are dropped
        let hostname = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| HostError::invalid(host, "host must include a hostname"))?
            .to_string();

        if hostname.ends_with("github.com") {
            return Ok(Self::Dotcom);
        }

        if hostname.ends_with("ghe.com") {
            if parsed.scheme() == "http" {
                return Err(HostError::invalid(
                    host,
                    "GitHub Enterprise Cloud hosts must use https",
                ));
            }
            return Ok(Self::EnterpriseCloud { hostname });
        }

        Ok(Self::EnterpriseServer {
            scheme: parsed.scheme().to_string(),
            hostname,
        })
    }

    /// Builds the endpoint bundle for this topology
    pub fn endpoints(self) -> Result<EndpointBundle, HostError> {
        let (rest, graphql, upload, raw_content) = match &self {
            Self::Dotcom => (
                DOTCOM_REST_URL.to_string(),
                DOTCOM_GRAPHQL_URL.to_string(),
                DOTCOM_UPLOAD_URL.to_string(),
                DOTCOM_RAW_URL.to_string(),
            ),
            Self::EnterpriseCloud { hostname } => (
                format!("https://api.{}/", hostname),
                format!("https://api.{}/graphql", hostname),
                format!("https://uploads.{}", hostname),
                format!("https://raw.{}/", hostname),
            ),
            Self::EnterpriseServer { scheme, hostname } => (
                format!("{}://{}/api/v3/", scheme, hostname),
                format!("{}://{}/api/graphql", scheme, hostname),
                format!("{}://{}/api/uploads/", scheme, hostname),
                format!("{}://{}/raw/", scheme, hostname),
            ),
        };

        Ok(EndpointBundle {
            rest: parse_endpoint(&rest)?,
            graphql: parse_endpoint(&graphql)?,
            upload: parse_endpoint(&upload)?,
            raw_content: parse_endpoint(&raw_content)?,
            topology: self,
        })
    }
}

fn parse_endpoint(url: &str) -> Result<Url, HostError> {
    Url::parse(url)
        .map_err(|e| HostError::invalid(url, format!("failed to build endpoint URL: {}", e)))
}

/// Resolves a host string into the endpoint bundle used for every GitHub call.
///
/// # Examples
///
/// ```
/// use github_mcp_server::github::host::{resolve_endpoints, Topology};
///
/// let endpoints = resolve_endpoints("https://ghes.example.org").unwrap();
/// assert_eq!(endpoints.rest.as_str(), "https://ghes.example.org/api/v3/");
/// assert!(matches!(endpoints.topology, Topology::EnterpriseServer { .. }));
///
/// assert!(resolve_endpoints("ghes.example.org").is_err());
/// ```
pub fn resolve_endpoints(host: &str) -> Result<EndpointBundle, HostError> {
    let topology = Topology::from_host(host)?;
    tracing::debug!("Resolved GitHub host '{}' to {:?}", host, topology);
    topology.endpoints()
}
