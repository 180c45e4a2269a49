//! Webserver entry point

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;

use enricher::{http_providers, Enricher, EnricherConfig, MemoryCacheStore, MemoryRecordStore, RecordStore};
use shared::logging;
use webserver::WebServer;

const SERVICE: &str = "webserver";

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "Animal catalog with enrichment from upstream providers")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Interface to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Preload the demo catalog into the record store
    #[arg(long)]
    seed_catalog: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    let address: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    logging::log_startup(SERVICE, &format!("webserver on http://{address}"));

    let config = EnricherConfig::from_env().context("loading enricher configuration")?;
    let providers = http_providers(&config).context("building provider adapters")?;
    let cache = Arc::new(MemoryCacheStore::new().with_capacity(config.cache_capacity));
    let enricher = Enricher::builder(cache).providers(providers).config(config).build();

    let records: Arc<dyn RecordStore> = if args.seed_catalog {
        Arc::new(MemoryRecordStore::with_seed_catalog().await?)
    } else {
        Arc::new(MemoryRecordStore::new())
    };

    let server = WebServer::new(enricher, records);
    server.run(address, shutdown_signal()).await?;

    logging::log_success(SERVICE, "Webserver stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => logging::log_shutdown(SERVICE, "Received Ctrl+C signal"),
        Err(err) => {
            logging::log_error(SERVICE, "Signal handling", &err);
            // Without a signal handler, keep serving until the process is killed
            std::future::pending::<()>().await;
        }
    }
}
