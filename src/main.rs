use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use motd_embed::adapters::java::JavaStatusClient;
use motd_embed::server::{self, AppState, CorsPolicy};
use motd_embed::{MotdService, Settings};

#[derive(Parser, Debug)]
#[command(name = "motd-embed")]
#[command(about = "Serve embeddable HTML renderings of Minecraft server MOTDs")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides `listen_addr`)
    #[arg(short, long)]
    listen: Option<String>,

    /// Log filter, e.g. "info" or "motd_embed=debug" (overrides `log_level`)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        settings.listen_addr = listen;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    settings.validate()?;

    init_tracing(&settings.log_level)?;

    let fetcher = JavaStatusClient::builder()
        .protocol_version(settings.origin.protocol_version)
        .build();
    let service = MotdService::builder(Arc::new(fetcher))
        .ttl(settings.cache_ttl())
        .origin_timeout(settings.origin_timeout())
        .max_entries(settings.max_entries())
        .static_base_url(settings.static_base_url())
        .build();

    let state = Arc::new(AppState {
        service,
        cors: CorsPolicy::new(settings.http.allowed_origins.iter().cloned()),
        request_timeout: settings.request_timeout(),
    });

    info!(
        ttl_secs = settings.cache.ttl_secs,
        max_entries = ?settings.max_entries(),
        "starting motd-embed"
    );

    let addr = settings.listen_socket_addr()?;
    server::bind_and_serve(addr, state, shutdown_signal())
        .await
        .with_context(|| format!("server on {addr} failed"))
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level {level:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}
