use std::sync::Arc;
use tokio::signal;
use tracing::info;

use ladder_persistence::connect_and_migrate;
use ladder_server::{
    AppState, auth::AuthService, config::Config, create_routes, mailer::LogMailer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    info!("Starting pickaladder server...");

    let config = Config::new();

    let db = match connect_and_migrate(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let auth_service = if config.auth_dev_mode {
        info!("Starting in development authentication mode - JWT validation disabled");
        Arc::new(AuthService::new_dev_mode())
    } else {
        Arc::new(AuthService::new(config.auth_project_id.clone()))
    };

    let addr = (
        config.host.parse::<std::net::IpAddr>().expect("Invalid HOST"),
        config.port,
    );
    let state = AppState::new(db, config, auth_service, Arc::new(LogMailer));
    let routes = create_routes(state);

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
                .expect("Failed to listen for SIGINT");
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to listen for SIGTERM");

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!("Server started on {}. Press Ctrl+C to stop.", addr);
    server.await;
    info!("Server shutdown complete.");
}
