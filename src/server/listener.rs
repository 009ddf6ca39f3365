use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::router::Router;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn run(cfg: &ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(cfg.listen_addr()).await?;
    info!(
        "Listening on {} (root: {}, workers: {})",
        cfg.listen_addr(),
        cfg.document_root.display(),
        cfg.max_workers
    );

    serve(listener, cfg).await
}

/// Accept loop over an already bound listener.
///
/// Every socket gets its own task straight away, and the task waits for one
/// of `max_workers` permits before reading. The loop itself never waits on
/// the bound, so saturated workers make new connections queue, not drop.
pub async fn serve(listener: TcpListener, cfg: &ServerConfig) -> anyhow::Result<()> {
    let router = Arc::new(Router::new(cfg));
    let workers = Arc::new(Semaphore::new(cfg.max_workers));

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        let workers = Arc::clone(&workers);
        tokio::spawn(async move {
            let Ok(_permit) = workers.acquire_owned().await else {
                return;
            };

            let mut conn = Connection::new(socket, router, peer.to_string());
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
