//! # Stockbook Web Server
//!
//! ## Usage
//! ```bash
//! # Serve HTTP
//! cargo run -p stockbook-web
//!
//! # Print a bearer token for a tenant
//! cargo run -p stockbook-web -- token acme
//! ```

use std::env;

use stockbook_core::TenantId;
use stockbook_db::Database;
use stockbook_web::{build_router, init_tracing, AppState, TokenManager, WebConfig};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = WebConfig::load()?;

    let args: Vec<String> = env::args().collect();
    if args.get(1).map(String::as_str) == Some("token") {
        let tenant = args.get(2).ok_or("usage: stockbook-web token <tenant-id>")?;
        let tokens = TokenManager::new(&config.jwt_secret, config.token_lifetime_secs);
        println!("{}", tokens.issue(&TenantId::new(tenant.as_str())?)?);
        return Ok(());
    }

    info!(
        bind_addr = %config.bind_addr,
        database = %config.database_path.display(),
        cost_basis = %config.cost_basis,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config()).await?;
    info!("Database ready");

    let bind_addr = config.bind_addr;
    let app = build_router(AppState::new(db.clone(), config));

    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
