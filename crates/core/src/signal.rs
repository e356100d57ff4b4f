//! Ctrl+C as a future the orchestrators can race against.

/// Resolves when the user presses Ctrl+C.
///
/// If the handler cannot be installed this never resolves, so the caller
/// simply runs to completion.
pub async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
