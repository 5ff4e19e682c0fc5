//! HTTP surface: webhook ingest, conversation turns and rendered transcripts.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

use crate::agent::Agent;
use crate::config::AgentConfig;

pub mod conversations;
pub mod error;
pub mod openapi;
pub mod webhook;

/// Handle to a running HTTP server. Dropping it stops serving.
pub struct Server {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
}

impl Server {
    /// Binds `config.bind_addr` (port 0 picks a free one) and serves in the
    /// background.
    pub async fn start(agent: Arc<Agent>, config: AgentConfig) -> Result<Self, String> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|error| format!("bind {}: {error}", config.bind_addr))?;
        let state = Arc::new(ServerState::new(agent, config));
        Self::serve(listener, router(state))
    }

    fn serve(listener: TcpListener, app: Router) -> Result<Self, String> {
        let addr = listener.local_addr().map_err(|error| error.to_string())?;
        let (stop, stopped) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let graceful = async move {
                let _ = stopped.await;
            };
            if let Err(error) = axum::serve(listener, app).with_graceful_shutdown(graceful).await {
                tracing::error!(%error, "server exited with error");
            }
            tracing::info!(%addr, "server stopped");
        });

        tracing::info!(%addr, "server listening");
        Ok(Self {
            addr,
            stop: Some(stop),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Idempotent; errors only when the serve task is already gone.
    pub fn shutdown(&mut self) -> Result<(), String> {
        match self.stop.take() {
            Some(stop) => stop
                .send(())
                .map_err(|_| format!("server on {} already stopped", self.addr)),
            None => Ok(()),
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Every route, with permissive CORS for browser transcript viewers.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/telegram", post(webhook::telegram))
        .route("/conversations/messages", post(conversations::post_message))
        .route("/conversations/transcript", get(conversations::transcript))
        .route("/conversations/render", get(conversations::render))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health() -> &'static str {
    "ok"
}

/// Shared by every handler.
pub struct ServerState {
    pub(crate) agent: Arc<Agent>,
    pub(crate) config: AgentConfig,
}

impl ServerState {
    pub fn new(agent: Arc<Agent>, config: AgentConfig) -> Self {
        Self { agent, config }
    }
}
