//! Listing Sentinel - New Token Liquidity Watcher
//!
//! Watches the Meteora DLMM pair listing for newly listed tokens.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use listing_sentinel::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();
    init_logging(app.debug, app.quiet)?;

    cli::execute(app).await
}

fn init_logging(debug: bool, quiet: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}
