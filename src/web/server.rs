// file: src/web/server.rs
// description: binds the listener and serves the router with request tracing
// reference: https://docs.rs/axum/latest/axum/fn.serve.html

use crate::error::Result;
use crate::service::SearchService;
use crate::web::routing::create_router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub async fn start_server(addr: SocketAddr, service: Arc<SearchService>) -> Result<()> {
    let app = create_router(service).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr).await?;
    info!("Search server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    info!("Search server shut down");
    Ok(())
}
