use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};
use url::Url;

use crate::config::{Config, StoreBackend};
use crate::routing::RouteError;
use crate::server::{build_router, AppState};
use crate::store::{object_id, StoreActor, StoreClient};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("server error: {0}")]
    Server(#[source] io::Error),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("task failed: {0}")]
    Join(#[from] JoinError),
}

/// The running application: one store and one HTTP server using it.
///
/// `ContactsSystem` is responsible for:
/// - **Lifecycle Management**: opening the store at startup and closing it at shutdown
/// - **Dependency Wiring**: handing the store to the server explicitly, never through a global
///
/// # Example
///
/// ```ignore
/// let system = ContactsSystem::start(&Config::from_env()?).await?;
/// println!("listening on {}", system.local_addr());
///
/// // Gracefully shut down when done
/// system.shutdown().await?;
/// ```
pub struct ContactsSystem {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    server: JoinHandle<io::Result<()>>,
    store: JoinHandle<()>,
}

impl ContactsSystem {
    /// Opens the store, binds the listener and starts serving.
    ///
    /// Bind to port `0` to let the OS pick a free port; [`local_addr`](Self::local_addr)
    /// reports the one chosen.
    pub async fn start(config: &Config) -> Result<Self, LifecycleError> {
        let (store, store_handle) = open_store(config);
        let state = AppState::new(Arc::new(store), config.request_timeout)?;

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| LifecycleError::Bind {
                addr: config.bind_addr,
                source,
            })?;
        let local_addr = listener.local_addr().map_err(LifecycleError::Server)?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = build_router(state);
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(%local_addr, store = %config.store_url, "Contacts system started");
        Ok(Self {
            local_addr,
            shutdown_tx,
            server,
            store: store_handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `http://<local_addr>/`, the base URL for client bindings.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}/", self.local_addr))
    }

    /// Gracefully shuts down the server, then the store.
    ///
    /// In-flight requests finish first. Once the server has stopped, the last
    /// store client is dropped with it and the store task exits on its own.
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        info!("Shutting down system...");
        let _ = self.shutdown_tx.send(());

        if let Err(e) = self.server.await?.map_err(LifecycleError::Server) {
            error!(error = %e, "Server stopped with error");
            return Err(e);
        }
        self.store.await?;

        info!("System shutdown complete.");
        Ok(())
    }
}

fn open_store(config: &Config) -> (StoreClient, JoinHandle<()>) {
    match config.store_url.backend {
        StoreBackend::Memory => {
            info!(store = %config.store_url, buffer = config.store_buffer, "Opening memory store");
            let (actor, client) = StoreActor::new(config.store_buffer, object_id);
            (client, tokio::spawn(actor.run()))
        }
    }
}
