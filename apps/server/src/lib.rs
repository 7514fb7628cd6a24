#![warn(clippy::all, clippy::pedantic)]

//! HTTP front-end for the health checker.
//!
//! Every `GET /health` request runs one synchronous check pass over the
//! configured endpoints and returns the results.

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use healthcheck::{Config, Orchestrator};
use tracing::info;

mod error;
pub mod routes;

pub use error::AppError;

/// State shared by all workers; read-only after start-up
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(config: Arc<Config>, orchestrator: Arc<Orchestrator>) -> Self {
        Self { config, orchestrator }
    }
}

/// Serve until the server is stopped (Ctrl-C)
///
/// # Errors
///
/// Fails when the address cannot be bound or the server stops with an I/O error.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), AppError> {
    let data = web::Data::new(state);

    let server =
        HttpServer::new(move || App::new().app_data(data.clone()).configure(routes::routes))
            .bind(addr)
            .map_err(|source| AppError::Bind { addr, source })?;

    info!(%addr, "health checker listening");
    server.run().await.map_err(AppError::Run)?;

    Ok(())
}

/// Parse a `host:port` pair into a socket address
///
/// # Errors
///
/// Fails when `host` is not an IP address.
pub fn socket_addr(host: &str, port: u16) -> Result<SocketAddr, AppError> {
    let ip = host
        .parse()
        .map_err(|source| AppError::BindHost { host: host.to_owned(), source })?;
    Ok(SocketAddr::new(ip, port))
}
