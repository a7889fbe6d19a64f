//! Mergington High School activities API.
//!
//! Students list the school's extracurricular activities, sign up for one, or
//! are removed from its roster. Rosters live in memory for the lifetime of the
//! process; the browser front end under `static/` talks to the JSON endpoints.
//!
//! | Route | |
//! |---|---|
//! | `GET /activities` | every activity keyed by name |
//! | `POST /activities/{name}/signup` | form field `email` |
//! | `DELETE /activities/{name}/participants/{email}` | |
//! | `GET /` | redirect to `/static/index.html` |
//!
//! Configuration comes from the environment (optionally a `.env` file):
//! `HOST`, `PORT`, `STATIC_DIR`, `ENFORCE_CAPACITY`. Log levels follow `RUST_LOG`.

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod web;

use config::Config;
use error::AppError;
use state::AppState;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

pub async fn start_server(config: Config) -> Result<(), AppError> {
    info!("Initializing state...");
    let state = AppState::from_config(&config);
    info!(
        activities = state.directory.activity_count(),
        capacity = ?state.capacity,
        "Activity directory seeded"
    );

    let app = web::router(state, &config.static_dir);

    let listener = bind_with_fallback(&config.host, config.port).await?;
    let bound = listener.local_addr()?;
    info!("Server running on http://{bound}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Binds `host:port`, falling back to the next port once if it is taken.
async fn bind_with_fallback(host: &str, port: u16) -> Result<TcpListener, AppError> {
    let address = format!("{host}:{port}");
    info!("Binding to {address}");

    let err = match TcpListener::bind(&address).await {
        Ok(listener) => return Ok(listener),
        Err(e) => e,
    };

    let Some(fallback_port) = port.checked_add(1) else {
        return Err(AppError::Bind { address, source: err });
    };
    let fallback = format!("{host}:{fallback_port}");
    warn!("Could not bind {address}: {err}. Trying fallback {fallback}");

    TcpListener::bind(&fallback)
        .await
        .map_err(|source| AppError::Bind {
            address: fallback,
            source,
        })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
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
}
