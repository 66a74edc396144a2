//! Relay node entry point.
//!
//! Reads its identity and listen address from the environment (or a `.env`
//! file) and serves `POST /` until the process is stopped.

use anyhow::Result;
use fault_relay::{utils, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    utils::init_tracing()?;

    let config = RelayConfig::from_env()?;
    fault_relay::run_relay_server(config).await
}
