pub mod client;
pub mod error;
pub mod graphql;
pub mod host;
pub mod transport;

pub use client::{GitHubClients, RawClient, RestClient, build_clients};
pub use graphql::GraphQLClient;
pub use host::{EndpointBundle, Topology, resolve_endpoints};
pub use transport::UserAgent;
