//! Shutdown signals and the drain deadline.

use std::fmt;
use std::time::Duration;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Process signal that stopped the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Resolves on interrupt, or never if the handler can't be installed.
async fn interrupt() -> StopSignal {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %err,
            "interrupt handler unavailable"
        );
        std::future::pending::<()>().await;
    }

    StopSignal::Interrupt
}

#[cfg(unix)]
async fn terminate() -> StopSignal {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                "terminate handler unavailable"
            );
            std::future::pending::<()>().await;
        }
    }

    StopSignal::Terminate
}

#[cfg(not(unix))]
async fn terminate() -> StopSignal {
    std::future::pending().await
}

/// Resolves once the process is asked to stop.
///
/// From then on the server stops accepting connections and in-flight scans
/// have `drain_timeout` to complete; a background task exits the process
/// when the deadline passes.
pub async fn shutdown_signal(drain_timeout: Duration) {
    let received = tokio::select! {
        signal = interrupt() => signal,
        signal = terminate() => signal,
    };

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        signal = %received,
        drain_timeout_secs = drain_timeout.as_secs(),
        "draining in-flight requests"
    );

    tokio::spawn(async move {
        tokio::time::sleep(drain_timeout).await;
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            drain_timeout_secs = drain_timeout.as_secs(),
            "drain deadline passed, exiting"
        );
        std::process::exit(1);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_display_their_names() {
        assert_eq!(StopSignal::Interrupt.to_string(), "SIGINT");
        assert_eq!(StopSignal::Terminate.to_string(), "SIGTERM");
    }
}
