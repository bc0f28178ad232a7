pub mod handlers;
pub mod routes;
pub mod state;

pub use handlers::*;
pub use routes::*;
pub use state::*;

use axum::extract::DefaultBodyLimit;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Bind and serve until the listener fails or the task is dropped.
///
/// CORS is wide open (the service fronts a public browser map client).
/// The request timeout stays off unless configured: in the deployed
/// topology the hosting platform owns the outer deadline.
pub async fn start_server(
    bind: String,
    port: u16,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let body_size_limit = (state.config.server.max_request_body_size_mb * 1024 * 1024) as usize;
    let request_timeout = state.config.server.request_timeout_ms;

    let mut app = routes::build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(body_size_limit)),
    );
    if let Some(ms) = request_timeout {
        app = app.layer(TimeoutLayer::new(Duration::from_millis(ms)));
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    info!("GeoRisk API listening on {}:{}", bind, port);

    axum::serve(listener, app).await?;
    Ok(())
}
