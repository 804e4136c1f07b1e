/// Initialise the global `tracing` subscriber.
///
/// Respects `RUST_LOG` when set, otherwise defaults to `"warden=info"`. This is
/// the one piece of process bootstrap the core provides; the embedding
/// process still owns calling it, typically as the first line of `main`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warden=info".into()),
        )
        .init();
}
