use crate::handlers;
use crate::service::DashboardService;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    service: Arc<DashboardService>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(service: Arc<DashboardService>) -> Self {
        Self { service }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/health", get(handlers::health))
            .route("/api/records", get(handlers::records))
            .route("/api/summary", get(handlers::summary))
            .route("/api/distribution", get(handlers::distribution))
            .route("/api/classes", get(handlers::classes))
            .route("/api/volatility-split", get(handlers::volatility_split))
            .route("/api/correlation/lag", get(handlers::lag_correlation))
            .route("/api/correlation/lags", get(handlers::lag_scan))
            .route("/api/correlation/rolling", get(handlers::rolling_correlation))
            .route("/api/trend", get(handlers::trend))
            .route("/api/forecast", get(handlers::forecast))
            .route("/api/simulate", get(handlers::simulate))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.service.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
