use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::Method,
    routing::{get, post},
    Router,
};
use blob_store::BlobStorageRegistry;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::ServerConfig, serving::ImageServer};

mod download;
mod upload;

use download::download_image;
use upload::upload_image;

#[derive(Clone)]
pub struct RouteState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<BlobStorageRegistry>,
    pub image_server: Arc<dyn ImageServer>,
}

pub fn create_routes(route_state: RouteState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route(
            "/gcs/{*path}",
            get(download_image).with_state(route_state.clone()),
        )
        .route(
            "/gcs/images/{file_name}",
            post(upload_image).with_state(route_state.clone()),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    let method = req.method();
                    let uri = req.uri();
                    tracing::debug_span!("request", %method, %uri)
                })
                .on_failure(()),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(usize::MAX))
}

async fn index() -> &'static str {
    "Image Store Server"
}
