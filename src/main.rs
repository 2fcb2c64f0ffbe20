//! PIT engine HTTP server.
//!
//! Environment:
//! - `PIT_ENGINE_ADDR`: listen address, default `0.0.0.0:3000`
//! - `PIT_ENGINE_POLICY_DIR`: optional directory of extra `*.yaml` policies,
//!   merged over the built-in presets
//! - `RUST_LOG`: log filter, default `info`

use std::error::Error;
use std::net::SocketAddr;

use pit_engine::api::{AppState, create_router};
use pit_engine::config::PolicyLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("PIT_ENGINE_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    let mut policies = PolicyLoader::builtin()?;
    if let Ok(dir) = std::env::var("PIT_ENGINE_POLICY_DIR") {
        let extra = PolicyLoader::load_dir(&dir)?;
        info!(dir = %dir, count = extra.len(), "Loaded extra policies");
        policies.merge(extra);
    }

    let app = create_router(AppState::new(policies));

    info!("pit-engine listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
