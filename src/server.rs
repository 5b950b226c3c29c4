use std::{io::ErrorKind, net::SocketAddr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::{api, error::Result, management::ControlState};

/// Outcome of claiming the control address.
pub enum Claim {
    /// This process owns the address and is the only instance.
    Acquired(TcpListener),
    /// Another instance is already listening.
    AlreadyRunning,
}

/// Binds the control address, which doubles as the single-instance lock.
pub async fn claim(addr: SocketAddr) -> Result<Claim> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(Claim::Acquired(listener)),
        Err(e) if e.kind() == ErrorKind::AddrInUse => Ok(Claim::AlreadyRunning),
        Err(e) => Err(e.into()),
    }
}

pub fn router(state: Arc<ControlState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/status", get(api::status))
        .route("/pause", post(api::pause))
        .route("/resume", post(api::resume))
        .route("/toggle", post(api::toggle))
        .route("/keep", post(api::keep))
        .route("/logs", get(api::logs))
        .route("/exit", post(api::exit))
        .layer(Extension(state))
}

pub async fn start_control_server(listener: TcpListener, state: Arc<ControlState>) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}
