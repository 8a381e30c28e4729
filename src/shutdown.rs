use tokio_util::sync::CancellationToken;

/// Install a Ctrl-C handler.
///
/// Returns a `CancellationToken` that is cancelled when the signal arrives.
/// A running simulation stops waiting on its timers once it is cancelled.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl-C, stopping simulation"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
        }
        token_clone.cancel();
    });

    token
}
