//! Main webserver implementation
//!
//! Wires the handlers into an axum router and serves it until the shutdown
//! future resolves.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use enricher::{Enricher, RecordStore};

use crate::error::{WebServerError, WebServerResult};
use crate::state::AppState;
use crate::web::handlers::{api, records};

/// Build the Axum router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(api::health))

        // Enrichment API
        .route("/api/enrichment", get(api::get_enrichment))
        .route("/api/stats", get(api::get_stats))

        // Catalog records
        .route("/animals", get(records::list_animals).post(records::create_animal))
        .route(
            "/animals/:id",
            get(records::get_animal)
                .put(records::update_animal)
                .delete(records::delete_animal),
        )
        .route("/animals/:id/enriched", get(records::get_enriched_animal))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}

pub struct WebServer {
    state: AppState,
}

impl WebServer {
    pub fn new(enricher: Enricher, records: Arc<dyn RecordStore>) -> Self {
        Self {
            state: AppState::new(enricher, records),
        }
    }

    pub fn build_router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Serve on `address` until `shutdown` resolves
    pub async fn run<F>(&self, address: SocketAddr, shutdown: F) -> WebServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(address)
            .await
            .map_err(|e| WebServerError::ServerStartup {
                address: address.to_string(),
                message: e.to_string(),
            })?;

        info!("🌐 Web server listening on http://{}", address);
        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
