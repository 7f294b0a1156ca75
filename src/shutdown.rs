//! Turns process signals into run cancellation.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Resolves on the first SIGINT, SIGTERM or SIGHUP (Ctrl-C elsewhere).
pub async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate())?;
        let mut hup = signal(SignalKind::hangup())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = term.recv() => {},
            _ = hup.recv() => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Cancels `cancel` when a shutdown signal arrives. The returned task can be
/// aborted once the run is over.
pub fn spawn_signal_listener(cancel: CancellationToken) -> JoinHandle<()> {
    listen(cancel, shutdown_signal())
}

/// Cancels on `signal` resolving `Ok`. If the handlers could not be
/// installed the run goes on without them.
fn listen<F>(cancel: CancellationToken, signal: F) -> JoinHandle<()>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            res = signal => match res {
                Ok(()) => {
                    log::debug!("Signal seen, sending abort!");
                    cancel.cancel();
                }
                Err(e) => log::warn!("Could not install signal handlers: {}", e),
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_cancels_the_run() {
        let cancel = CancellationToken::new();
        listen(cancel.clone(), async { Ok(()) }).await.unwrap();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn handler_setup_failure_leaves_the_run_alone() {
        let cancel = CancellationToken::new();
        listen(cancel.clone(), async { Err(std::io::Error::other("no signals")) })
            .await
            .unwrap();
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn listener_exits_once_cancelled() {
        let cancel = CancellationToken::new();
        let handle = listen(cancel.clone(), std::future::pending());
        cancel.cancel();
        handle.await.unwrap();
    }
}
