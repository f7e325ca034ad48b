use std::sync::Arc;

use anyhow::Result;
use kindred::events::{BroadcastEventSink, LoggingEventSink, SinkRegistry};
use kindred::scheduler::ResetScheduler;
use kindred::service::FamilyManager;
use kindred::storage::InMemoryMemberStore;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use kindred_server::cli::CliArgs;
use kindred_server::config::ServerConfig;
use kindred_server::create_router;
use kindred_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Set up logging
    let filter = if let Some(ref level) = cli_args.log_level {
        tracing_subscriber::EnvFilter::new(level)
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("kindred=info".parse()?)
            .add_directive("kindred_server=info".parse()?)
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Kindred server v{}", kindred::VERSION);

    let server_config = ServerConfig::from_cli(&cli_args);

    // Load engine configuration from file if provided
    let kindred_config = if let Some(config_file) = &cli_args.config_file {
        info!("Loading configuration from: {}", config_file.display());
        let mut loader = kindred::config::ConfigLoader::new();
        match loader.load_file(config_file) {
            Ok(loader) => match loader.load_env().extract() {
                Ok(config) => config,
                Err(e) => {
                    warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        config_file.display(),
                        e
                    );
                    kindred::config::ConfigBuilder::defaults().build()?
                }
            },
            Err(e) => {
                warn!(
                    "Failed to load config file {}: {}. Using defaults.",
                    config_file.display(),
                    e
                );
                kindred::config::ConfigBuilder::defaults().build()?
            }
        }
    } else {
        let mut loader = kindred::config::ConfigLoader::new();
        loader.load_default_files().load_env();
        loader.extract()?
    };

    // Wire the engine: store, event sinks, manager
    let store = Arc::new(InMemoryMemberStore::new());
    let broadcast_sink = Arc::new(BroadcastEventSink::new(1024));
    let event_sender = broadcast_sink.sender();
    let sinks = SinkRegistry::new()
        .with_sink(Arc::new(LoggingEventSink))
        .with_sink(broadcast_sink);
    let manager = FamilyManager::new(store, sinks);
    info!("Kindred family manager initialized");

    // Start the daily reset scheduler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = ResetScheduler::new(
        Arc::new(manager.clone()),
        kindred_config.scheduler,
    )?;
    let scheduler_handle = scheduler.spawn(shutdown_rx);

    // Build the router
    let state = Arc::new(AppState::new(manager, server_config.clone(), event_sender));
    let mut app = create_router(state).layer(TraceLayer::new_for_http());
    if server_config.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = server_config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Kindred server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the scheduler; an in-flight reset finishes before the task ends.
    let _ = shutdown_tx.send(true);
    let _ = scheduler_handle.await;
    info!("Kindred server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
