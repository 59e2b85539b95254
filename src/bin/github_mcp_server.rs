use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt};

use github_mcp_server::config::{ServerConfig, StdioServerConfig};
use github_mcp_server::tools::toolsets::parse_toolset_names;
use github_mcp_server::translations::Translator;
use github_mcp_server::transport::lifecycle::Shutdown;
use github_mcp_server::transport::stdio::run_stdio_server;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "GitHub MCP Server - Model Context Protocol server bridging MCP clients to the GitHub API"
)]
#[command(
    long_about = "GitHub MCP Server exposes GitHub repositories, issues and the authenticated user as MCP tools over stdin/stdout. It works against GitHub.com, GitHub Enterprise Cloud (*.ghe.com) and GitHub Enterprise Server, selected with --gh-host."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// GitHub personal access token used for every API call
    #[arg(long, env = "GITHUB_PERSONAL_ACCESS_TOKEN", hide_env_values = true, global = true)]
    personal_access_token: Option<String>,

    /// GitHub host, e.g. "https://ghes.example.org" or "https://tenant.ghe.com". Empty for GitHub.com. The scheme is required
    #[arg(long, env = "GITHUB_HOST", default_value = "", global = true)]
    gh_host: String,

    /// Comma separated toolsets to enable ("all" enables every toolset)
    #[arg(long, env = "GITHUB_TOOLSETS", default_value = "all", global = true)]
    toolsets: String,

    /// Start with only the context toolset and let the client enable others at runtime
    #[arg(long, env = "GITHUB_DYNAMIC_TOOLSETS", global = true)]
    dynamic_toolsets: bool,

    /// Only register read-only tools
    #[arg(long, env = "GITHUB_READ_ONLY", global = true)]
    read_only: bool,

    /// Path to write logs to instead of stderr
    #[arg(long, env = "GITHUB_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Log all stdin/stdout traffic
    #[arg(long, env = "GITHUB_ENABLE_COMMAND_LOGGING", global = true)]
    enable_command_logging: bool,

    /// Write the translation keys to github-mcp-server-config.json and exit
    #[arg(long, global = true)]
    export_translations: bool,

    /// Enable debug logging for troubleshooting and development
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server in stdin/stdout mode for MCP client integration
    Stdio,
}

/// Sends diagnostics to the log file when given, otherwise to stderr.
/// Stdout is reserved for protocol traffic.
fn init_tracing(debug: bool, log_file: Option<&PathBuf>) -> Result<()> {
    let level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},{}={}", level, env!("CARGO_CRATE_NAME"), level).into());

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let args = cli.global;

    init_tracing(args.debug, args.log_file.as_ref())?;

    match cli.command {
        Commands::Stdio => {
            let mut server = ServerConfig::new(
                env!("CARGO_PKG_VERSION"),
                args.gh_host,
                args.personal_access_token.unwrap_or_default(),
            );
            server.enabled_toolsets = parse_toolset_names(&args.toolsets);
            server.dynamic_toolsets = args.dynamic_toolsets;
            server.read_only = args.read_only;
            server.translator = Translator::load()?;

            let config = StdioServerConfig {
                server,
                enable_command_logging: args.enable_command_logging,
                export_translations: args.export_translations,
            };

            let outcome = run_stdio_server(config).await?;
            if outcome == Shutdown::Signalled {
                // The stdin reader is a blocking read the runtime would wait on
                std::process::exit(0);
            }
            Ok(())
        }
    }
}
