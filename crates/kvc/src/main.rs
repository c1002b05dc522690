//! kvc - Entry Point
//!
//! Binary entry point for the `kvc` command line tool.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `kvc ping` | Check store availability |
//! | `kvc health` | Print a health snapshot as JSON |
//! | `kvc lock <key>` | Hold a lock for a while |
//! | `kvc get/set/del` | Cache access |
//! | `kvc publish/subscribe` | Channel messaging |
//! | `kvc monitor` | Poll connection status and expose Prometheus metrics |

use clap::Parser;
use kvc::cli::{Cli, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}
