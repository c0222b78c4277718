//! Booking node binary
//!
//! Reads invocations from stdin, one per line: `<function> <role> [args...]`.
//! A `metrics` line prints the Prometheus exposition.

use anyhow::Context;
use booking_ledger::{BookingStore, MemoryStateStore, RocksStateStore, StateStore};
use booking_lifecycle::{BookingService, Config, Invocation, LedgerBackend, Metrics, Router};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        None => Config::from_env().context("loading config from environment")?,
    };

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        commission_rate = %config.commission_rate.rate(),
        "Starting booking node"
    );

    let state: Arc<dyn StateStore> = match &config.ledger {
        LedgerBackend::Memory => {
            tracing::warn!("Using in-memory ledger, bookings are lost on exit");
            Arc::new(MemoryStateStore::new())
        }
        LedgerBackend::Rocksdb(ledger) => {
            Arc::new(RocksStateStore::open(ledger).context("opening RocksDB ledger")?)
        }
    };

    let service = BookingService::new(BookingStore::new(state), config.commission_rate);
    let router = Router::new(service, Metrics::new()?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        };

        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let reply = if line == "metrics" {
            router.metrics().render()?
        } else {
            match Invocation::from_line(line) {
                Some(invocation) => match router.invoke(&invocation) {
                    Ok(payload) if payload.is_empty() => "ok".to_string(),
                    Ok(payload) => String::from_utf8_lossy(&payload).into_owned(),
                    Err(e) => format!("error: {}", e),
                },
                None => "error: expected <function> <role> [args...]".to_string(),
            }
        };

        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    tracing::info!("Shutting down booking node");
    Ok(())
}
