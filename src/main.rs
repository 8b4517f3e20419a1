//! Entry point for the tax engine binary.
//!
//! Running this binary starts an HTTP server exposing the calculation
//! API.  The listen address may be set via the `TAX_BIND_ADDR`
//! environment variable; log verbosity follows `RUST_LOG`.

use anyhow::Result;
use naira_tax::{api, config::Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    api::serve(config).await
}
