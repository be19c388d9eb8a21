mod config;
mod database;
mod logging;
mod middleware;
mod routes;
mod services;
mod utils;

use crate::{config::VERSION, services::sessions::Sessions};
use axum::Extension;
use log::{error, info};
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = Arc::new(config::load_config().unwrap_or_default());

    // Initialize logging
    logging::setup(config.logging);

    info!("Starting Touchline v{}", VERSION);

    // Connect the database, applying any pending migrations
    let db = database::init().await;

    // In-memory session store
    let sessions = Arc::new(Sessions::new());

    let router = routes::router()
        .layer(Extension(db))
        .layer(Extension(config.clone()))
        .layer(Extension(sessions));

    let addr = SocketAddr::new(config.host, config.port);
    info!("Starting server on {addr}");

    let listener = match TcpListener::bind(addr).await {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to bind server (Addr: {addr}): {err:?}");
            panic!();
        }
    };

    if let Err(err) = axum::serve(listener, router)
        .with_graceful_shutdown(async {
            _ = signal::ctrl_c().await;
        })
        .await
    {
        error!("Error while running server: {err:?}");
    }
}
