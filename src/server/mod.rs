use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use self::state::AppState;
use handlers::{
    get_config, get_features, get_popup, get_settings, index_html, post_click, post_close,
    update_settings,
};

// Create the main application router
fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/api/config", get(get_config))
        .route("/api/features", get(get_features))
        .route("/api/click", post(post_click))
        .route("/api/close", post(post_close))
        .route("/api/popup", get(get_popup))
        .route("/api/settings", get(get_settings).post(update_settings))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<()> {
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    info!("HTTP server started at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
