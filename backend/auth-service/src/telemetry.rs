/// Tracing setup for the binary
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "auth_service=info,actix_web=info";

/// Install a JSON `tracing` subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .json()
        .init();
}
