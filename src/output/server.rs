//! Static file server for the rendered site

use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Builds a router serving every file under `root`
pub fn router(root: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(TraceLayer::new_for_http())
}

/// Binds `addr` and serves `root` until the process is stopped
pub async fn serve(root: &Path, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, root).await
}

/// Serves `root` on an already bound listener
pub async fn serve_listener(listener: TcpListener, root: &Path) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Serving {} on http://{}", root.display(), addr);

    axum::serve(listener, router(root)).await
}
