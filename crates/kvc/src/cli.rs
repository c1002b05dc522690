//! Command line interface
//!
//! Every command runs against one [`CoordinationContext`]. Output goes to
//! the writer passed to [`execute`], so commands can be driven from tests.

use clap::{Parser, Subcommand};
use futures::StreamExt;
use kvc_domain::error::{Error, Result};
use kvc_domain::value_objects::{CriticalSection, StoreOperation};
use kvc_infrastructure::config::{ConfigLoader, StoreConfig};
use kvc_infrastructure::error_ext::ErrorContext;
use kvc_infrastructure::logging::init_logging;
use kvc_infrastructure::CoordinationContext;
use kvc_providers::InMemoryStore;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Command line interface for kvc
#[derive(Parser, Debug)]
#[command(name = "kvc")]
#[command(about = "kvc - Redis coordination toolkit")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use a process-local store instead of Redis
    #[arg(long, global = true)]
    pub memory: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Check whether the store answers within the connect timeout
    Ping,

    /// Probe the store and print the health snapshot
    Health,

    /// Acquire a lock, hold it, then release it
    Lock {
        /// Lock key
        key: String,

        /// Maximum wait for the lock in milliseconds
        #[arg(long)]
        wait_ms: Option<u64>,

        /// Lease in milliseconds
        #[arg(long)]
        lease_ms: Option<u64>,

        /// How long to hold the lock in milliseconds
        #[arg(long, default_value_t = 0)]
        hold_ms: u64,
    },

    /// Read a cache entry
    Get {
        /// Cache key
        key: String,
    },

    /// Write a cache entry
    Set {
        /// Cache key
        key: String,

        /// JSON value; anything else is stored as a string
        value: String,

        /// Time to live in seconds
        #[arg(long)]
        ttl_secs: Option<u64>,
    },

    /// Delete a cache entry
    Del {
        /// Cache key
        key: String,
    },

    /// Publish a message on a channel
    Publish {
        /// Channel name
        channel: String,

        /// Message payload
        message: String,
    },

    /// Print messages published on a channel
    Subscribe {
        /// Channel name
        channel: String,

        /// Stop after this many messages
        #[arg(long)]
        count: Option<usize>,
    },

    /// Poll connection status until interrupted
    Monitor {
        /// Serve Prometheus metrics on this address
        #[arg(long)]
        metrics_addr: Option<SocketAddr>,
    },
}

/// Load configuration, connect and run the command
pub async fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load()?;
    init_logging(&config.logging)?;

    let context = connect(config, cli.memory).await?;
    let mut stdout = std::io::stdout().lock();
    execute(&context, cli.command, &mut stdout).await
}

async fn connect(config: StoreConfig, memory: bool) -> Result<CoordinationContext> {
    if memory {
        info!("Using in-memory store");
        CoordinationContext::with_store(config, Arc::new(InMemoryStore::new())).await
    } else {
        CoordinationContext::connect(config).await
    }
}

/// Run one command, writing results to `out`
pub async fn execute<W: Write>(
    context: &CoordinationContext,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Ping => {
            if context.provider().is_available().await {
                emit(out, "PONG")
            } else {
                Err(Error::connection(StoreOperation::Ping, "store is unavailable"))
            }
        }
        Command::Health => {
            let snapshot = context.health().health().await;
            emit(out, serde_json::to_string_pretty(&snapshot)?)
        }
        Command::Lock {
            key,
            wait_ms,
            lease_ms,
            hold_ms,
        } => {
            let lock_config = &context.config().lock;
            let wait = wait_ms.map_or(lock_config.default_wait(), Duration::from_millis);
            let lease = lease_ms.map_or(lock_config.default_lease(), Duration::from_millis);
            let outcome = context
                .locks()
                .execute_with_lock(&key, wait, lease, || async {
                    tokio::time::sleep(Duration::from_millis(hold_ms)).await;
                    Ok::<_, Error>(())
                })
                .await?;
            let line = match outcome {
                CriticalSection::Completed(()) => format!("{key}: acquired and released"),
                CriticalSection::Contended => format!("{key}: held by another owner"),
                CriticalSection::Unavailable => format!("{key}: lock service unavailable"),
            };
            emit(out, line)
        }
        Command::Get { key } => match context.cache().get::<serde_json::Value>(&key).await? {
            Some(value) => emit(out, value),
            None => emit(out, "(nil)"),
        },
        Command::Set {
            key,
            value,
            ttl_secs,
        } => {
            let value = serde_json::from_str::<serde_json::Value>(&value)
                .unwrap_or(serde_json::Value::String(value));
            context
                .cache()
                .set(&key, &value, ttl_secs.map(Duration::from_secs))
                .await?;
            emit(out, "OK")
        }
        Command::Del { key } => {
            let removed = context.cache().delete(&key).await?;
            emit(out, u8::from(removed))
        }
        Command::Publish { channel, message } => {
            let delivered = context.provider().publish(&channel, &message).await?;
            emit(out, delivered)
        }
        Command::Subscribe { channel, count } => {
            let mut subscription = context.provider().subscribe_to_channel(&channel).await?;
            let token = subscription.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            });

            let mut received = 0;
            while count.is_none_or(|limit| received < limit) {
                let Some(message) = subscription.next().await else {
                    break;
                };
                emit(out, format!("{}: {}", message.channel, message.payload))?;
                received += 1;
            }
            Ok(())
        }
        Command::Monitor { metrics_addr } => {
            if let Some(addr) = metrics_addr {
                PrometheusBuilder::new()
                    .with_http_listener(addr)
                    .install()
                    .context("Failed to start Prometheus exporter")?;
                info!(%addr, "Serving Prometheus metrics");
            }
            let Some(monitor) = context.start_metrics() else {
                return Err(Error::configuration("metrics are disabled in configuration"));
            };
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for interrupt")?;
            monitor.shutdown().await;
            emit(out, "monitor stopped")
        }
    }
}

fn emit<W: Write, D: std::fmt::Display>(out: &mut W, line: D) -> Result<()> {
    writeln!(out, "{line}").context("Failed to write output")
}
