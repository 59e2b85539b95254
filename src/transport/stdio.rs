use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::StdioServerConfig;
use crate::error_store::{ErrorStore, with_github_errors};
use crate::github::{build_clients, resolve_endpoints};
use crate::tools::GitHubMcpServer;
use crate::transport::io_logger::{LoggedReader, LoggedWriter};
use crate::transport::lifecycle::{Shutdown, cancel_on_termination_signal, wait_for_shutdown};

/// Resolves the GitHub endpoints, builds the API clients and registers the
/// toolsets. Any failure here is fatal to startup.
pub fn build_server(config: &StdioServerConfig) -> Result<GitHubMcpServer> {
    let server_config = &config.server;
    server_config.validate()?;

    let endpoints =
        resolve_endpoints(&server_config.host).context("Failed to resolve GitHub host")?;
    let clients = build_clients(&endpoints, &server_config.token, &server_config.version)
        .context("Failed to build GitHub clients")?;

    GitHubMcpServer::new(server_config, clients).context("Failed to enable toolsets")
}

/// Serves one client over `reader`/`writer` until the client goes away or
/// `shutdown` is cancelled.
///
/// The initialize handshake happens inside `serve_with_ct`, so this covers the
/// whole life of the connection.
pub async fn serve_connection<R, W>(
    server: GitHubMcpServer,
    reader: R,
    writer: W,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let running = server.serve_with_ct((reader, writer), shutdown).await?;
    running.waiting().await?;
    Ok(())
}

fn spawn_request_loop(
    server: GitHubMcpServer,
    command_logging: bool,
    shutdown: CancellationToken,
) -> JoinHandle<Result<()>> {
    let (stdin, stdout) = rmcp::transport::stdio();
    // The run loop keeps a store of its own so one is always in scope
    let store = ErrorStore::new();

    if command_logging {
        tokio::spawn(with_github_errors(
            store,
            serve_connection(
                server,
                LoggedReader::new(stdin),
                LoggedWriter::new(stdout),
                shutdown,
            ),
        ))
    } else {
        tokio::spawn(with_github_errors(
            store,
            serve_connection(server, stdin, stdout, shutdown),
        ))
    }
}

/// Runs the MCP server in STDIN/STDOUT mode.
///
/// This mode is used when the server is launched as a subprocess by an MCP client,
/// communicating through standard input/output streams. Stdout carries protocol
/// traffic only; diagnostics go through `tracing`.
///
/// # Returns
/// * `Result<Shutdown>` - How the server stopped, or the error that stopped the
///   request loop. After [`Shutdown::Signalled`] the stdin reader may still be
///   blocked, so the caller should exit the process instead of waiting for the
///   runtime to wind down.
pub async fn run_stdio_server(config: StdioServerConfig) -> Result<Shutdown> {
    let server = build_server(&config)?;

    if config.export_translations {
        let path = config
            .server
            .translator
            .export(std::path::Path::new(crate::translations::TRANSLATIONS_FILE))?;
        tracing::info!("Exported translations to {}", path.display());
        return Ok(Shutdown::Completed);
    }

    let shutdown = cancel_on_termination_signal();
    let request_loop =
        spawn_request_loop(server, config.enable_command_logging, shutdown.clone());
    tracing::info!("GitHub MCP Server running on stdio");

    let outcome = wait_for_shutdown(shutdown, request_loop).await?;
    tracing::debug!("Server stopped: {:?}", outcome);
    Ok(outcome)
}
