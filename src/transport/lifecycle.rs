//! Process-level cancellation and shutdown arbitration

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How the server stopped running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// A termination signal cancelled the root token
    Signalled,
    /// The request loop finished on its own (the client closed the stream)
    Completed,
}

/// Returns a token cancelled on Ctrl+C or, on unix, SIGTERM.
///
/// The SIGTERM handler is installed before this returns, so a signal sent
/// right after startup is not lost to the default action.
pub fn cancel_on_termination_signal() -> CancellationToken {
    let token = CancellationToken::new();
    let signalled = token.clone();
    let termination = termination_signal();
    tokio::spawn(async move {
        termination.await;
        tracing::debug!("Termination signal received");
        signalled.cancel();
    });
    token
}

#[cfg(unix)]
fn termination_signal() -> impl std::future::Future<Output = ()> + Send + 'static {
    use tokio::signal::unix::{SignalKind, signal};

    let terminate = signal(SignalKind::terminate());
    async move {
        match terminate {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
}

#[cfg(not(unix))]
fn termination_signal() -> impl std::future::Future<Output = ()> + Send + 'static {
    async {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Blocks until either `shutdown` is cancelled or the request loop finishes.
///
/// On cancellation this returns immediately without joining the loop task;
/// whatever it is still doing is abandoned with the process, and the caller
/// is expected to exit rather than wait for it. A loop error becomes the
/// returned error.
pub async fn wait_for_shutdown(
    shutdown: CancellationToken,
    request_loop: JoinHandle<Result<()>>,
) -> Result<Shutdown> {
    // The loop watches the same token, so both branches can be ready at once
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            tracing::info!("shutting down server...");
            Ok(Shutdown::Signalled)
        }
        joined = request_loop => match joined {
            Ok(Ok(())) if shutdown.is_cancelled() => {
                tracing::info!("shutting down server...");
                Ok(Shutdown::Signalled)
            }
            Ok(Ok(())) => Ok(Shutdown::Completed),
            Ok(Err(e)) => Err(e.context("error running server")),
            Err(e) => Err(anyhow::Error::new(e).context("server task failed")),
        },
    }
}
