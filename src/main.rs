use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use routewire::message::{
    setup, AppFactory, MemoryTransport, MessageController, Registration, Transport, MESSAGE_LABEL,
};
use routewire::runtime_config::RuntimeConfig;
use routewire::server::{AppService, HttpServer};

/// Message service on the routewire dispatch engine.
#[derive(Parser, Debug)]
#[command(name = "routewire", version, about)]
struct Cli {
    /// Address to bind to
    #[arg(long, env = "ROUTEWIRE_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,

    /// Environment label handed to the application factory
    #[arg(long, env = "ROUTEWIRE_ENV", default_value = "dev")]
    env: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = RuntimeConfig::from_env();
    may::config().set_stack_size(config.stack_size);

    let transport: Arc<dyn Transport> = Arc::new(MemoryTransport::with_page_size(config.page_size));
    let factory = Arc::new(AppFactory::new(cli.env.clone(), Arc::clone(&transport)));
    let mux = setup(
        factory,
        vec![Registration::new(
            Box::new(MessageController { transport }),
            MESSAGE_LABEL,
        )],
    );

    let handle = HttpServer(AppService::new(mux))
        .start(&cli.addr)
        .with_context(|| format!("failed to bind {}", cli.addr))?;

    info!(
        addr = %cli.addr,
        env = %cli.env,
        stack_size = config.stack_size,
        page_size = config.page_size,
        "Message service listening"
    );

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))?;
    Ok(())
}
