//! Exit reporting for the serving loop.

use std::future::Future;
use std::io;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Drives `server` to completion and reports how it ended.
pub async fn run_until_stopped(
    config: &ServerConfig,
    server: impl Future<Output = io::Result<()>>,
) -> io::Result<()> {
    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            host = %config.host,
            "listening on every interface; scans are unauthenticated"
        );
    }

    let started = Instant::now();
    let outcome = server.await;
    report_exit(&outcome, started.elapsed().as_secs());
    outcome
}

fn report_exit(outcome: &io::Result<()>, uptime_secs: u64) {
    let Err(err) = outcome else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            uptime_secs,
            "server stopped"
        );
        return;
    };

    tracing::error!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        error = %err,
        kind = ?err.kind(),
        uptime_secs,
        hint = bind_hint(err.kind()).unwrap_or_default(),
        "server failed"
    );
}

/// Operator hint for socket errors that usually come from misconfiguration.
fn bind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    let hint = match kind {
        io::ErrorKind::AddrInUse => "another process holds this port; set PORT to a free one",
        io::ErrorKind::AddrNotAvailable => "HOST is not an address of this machine",
        io::ErrorKind::PermissionDenied => "binding this port needs elevated privileges",
        _ => return None,
    };

    Some(hint)
}
