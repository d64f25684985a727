//! Listener and dispatch loop.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{Semaphore, watch},
    task::JoinSet,
};
use tower_http::trace::TraceLayer;

use crate::{config::ServerConfig, error::ServerError};

use super::{
    handler::{
        http::{get_history, get_participants, health_check},
        session::handle_connection,
    },
    state::AppState,
};

/// Back-off after a failed `accept` (e.g. file descriptor exhaustion)
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Line-oriented chat relay server
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(AppState::in_memory(&config, Arc::new(SystemClock))?);
/// Server::new(state, config).run().await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl Server {
    pub fn new(state: Arc<AppState>, config: ServerConfig) -> Self {
        Self { state, config }
    }

    /// Bind the chat (and optional admin) listeners and serve until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if either address cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = bind(&self.config.bind_addr()).await?;
        let admin_listener = match self.config.admin_addr() {
            Some(addr) => Some(bind(&addr).await?),
            None => None,
        };

        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener, admin_listener, super::shutdown_signal())
            .await
    }

    /// Serve on already-bound listeners until `shutdown` resolves.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        admin_listener: Option<TcpListener>,
        shutdown: F,
    ) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        tracing::info!("Chat relay listening on {}", listener.local_addr()?);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let admin_task = match admin_listener {
            Some(admin_listener) => {
                tracing::info!("Admin API listening on http://{}", admin_listener.local_addr()?);
                Some(tokio::spawn(serve_admin(
                    admin_listener,
                    self.state.clone(),
                    shutdown_rx,
                )))
            }
            None => None,
        };

        let permits = Arc::new(Semaphore::new(self.config.max_connections));
        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("Accepted connection from {}", peer);
                        self.dispatch(stream, &permits, &mut sessions);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                _ = &mut shutdown => break,
            }

            // Reap finished sessions so the set only tracks live ones
            while let Some(result) = sessions.try_join_next() {
                if let Err(e) = result {
                    tracing::error!("Session task failed: {}", e);
                }
            }
        }

        tracing::info!("Closing {} active sessions", sessions.len());
        sessions.shutdown().await;

        let _ = shutdown_tx.send(true);
        if let Some(admin_task) = admin_task {
            match admin_task.await {
                Ok(Err(e)) => tracing::error!("Admin API error: {}", e),
                Err(e) => tracing::error!("Admin API task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Spawn a session for `stream`, or close it when the server is at capacity.
    fn dispatch(&self, stream: TcpStream, permits: &Arc<Semaphore>, sessions: &mut JoinSet<()>) {
        let Ok(permit) = permits.clone().try_acquire_owned() else {
            tracing::warn!(
                "Connection limit ({}) reached, rejecting connection",
                self.config.max_connections
            );
            drop(stream);
            return;
        };

        let id = self.state.connection_ids.generate();
        let state = self.state.clone();
        sessions.spawn(async move {
            let _permit = permit;
            let (reader, writer) = stream.into_split();
            handle_connection(state, id, reader, writer).await;
        });
    }
}

/// Build the admin HTTP router.
fn admin_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/participants", get(get_participants))
        .route("/api/history", get(get_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_admin(
    listener: TcpListener,
    state: Arc<AppState>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    axum::serve(listener, admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        })
        .await
}

async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })
}
