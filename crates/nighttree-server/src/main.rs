mod config;
mod connection;
mod console;
mod permissions;
mod persistence;
mod registry;

use std::sync::Arc;

use config::ServerConfig;
use connection::ConnectionHandler;
use nighttree_net::NetServer;
use permissions::PermissionManager;
use persistence::WorldStore;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = Arc::new(match ServerConfig::load_or_create("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    });

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "Night Tree server v{} starting on {}",
        env!("CARGO_PKG_VERSION"),
        config.server.bind_address()
    );
    info!("Server name: {}", config.server.name);
    info!("MOTD: {}", config.server.motd);
    info!("Max players: {}", config.server.max_players);
    if config.server.required_password().is_some() {
        info!("Password required to join");
    }

    let storage = config.storage.directory.clone();
    let world = match WorldStore::open(
        &storage,
        &config.world.name,
        config.world.width,
        config.world.height,
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to open world '{}': {e}", config.world.name);
            std::process::exit(1);
        }
    };
    let permissions = PermissionManager::load(&storage);

    let (mut server, mut events) = match NetServer::bind(config.server.bind_address()).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to bind {}: {e}", config.server.bind_address());
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let shutdown_tx_ctrlc = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        shutdown_tx_ctrlc.send_replace(true);
    });

    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    console::spawn(console_tx);

    let shutdown_tx_handler = shutdown_tx.clone();
    let mut shutdown_rx_handler = shutdown_rx.clone();
    let handler_task = tokio::spawn(async move {
        let mut handler =
            ConnectionHandler::new(config, world, permissions, shutdown_tx_handler);
        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(e) => handler.handle_event(e),
                        None => break,
                    }
                }
                Some(line) = console_rx.recv() => {
                    handler.handle_console_command(&line);
                }
                _ = shutdown_rx_handler.changed() => {
                    if *shutdown_rx_handler.borrow() {
                        info!("Saving before shutdown...");
                        handler.save_all();
                        break;
                    }
                }
            }
        }
    });

    let server_task = tokio::spawn(async move { server.run(shutdown_rx).await });

    let handler_result = handler_task.await;
    shutdown_tx.send_replace(true);
    if let Err(e) = server_task.await {
        error!("Listener task failed: {e}");
    }
    if let Err(e) = handler_result {
        error!("Server task failed: {e}");
        std::process::exit(1);
    }
    info!("Server shut down.");
}
