//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the dispatcher mounted as fallback
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Apply route table reloads while serving
//! - Stop gracefully on the shutdown signal

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{install_routes, RouterConfig};
use crate::http::request::raw_request;
use crate::routing::{Dispatcher, RouteError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_bytes: usize,
}

/// HTTP front end for a dispatcher.
pub struct HttpServer {
    router: Router,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Create a server whose routes come from `config.routes`.
    pub fn new(config: RouterConfig) -> Result<Self, RouteError> {
        let dispatcher = Arc::new(Dispatcher::new());
        let count = install_routes(dispatcher.table(), &config.routes)?;
        tracing::info!(routes = count, "Declarative routes installed");
        Ok(Self::with_dispatcher(&config, dispatcher))
    }

    /// Create a server around an existing dispatcher and its registered routes.
    pub fn with_dispatcher(config: &RouterConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState {
            dispatcher: dispatcher.clone(),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(config, state);
        Self { router, dispatcher }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Every config received on `config_updates` replaces the route table
    /// atomically. Returns once `shutdown` fires and in-flight requests drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RouterConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.dispatcher.table().len(),
            "HTTP server starting"
        );

        let table = self.dispatcher.table().clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match install_routes(&table, &config.routes) {
                    Ok(count) => tracing::info!(routes = count, "Routes reloaded"),
                    Err(e) => {
                        tracing::error!(error = %e, "Reload rejected; keeping current routes")
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

/// Buffers the body and hands the request to the dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let raw = raw_request(&parts);

    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(path = %raw.path, error = %e, "Request body rejected");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    state.dispatcher.serve(raw, body).await
}
