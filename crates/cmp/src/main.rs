//! Consent Engine - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cmp serve` | Run the persistence service |
//! | `cmp simulate --site <id> --choice accept` | Drive the engine against a virtual page |

// Force-link cmp-providers so the linkme registrations are included
extern crate cmp_providers;

use clap::Parser;
use cmp::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}
