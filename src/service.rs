use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use blob_store::BlobStorageRegistry;
use tokio::signal;
use tracing::info;

use crate::{
    config::{ServeMode, ServerConfig},
    routes::{create_routes, RouteState},
    serving::{ImageServer, RedirectImageServer, StreamingImageServer},
};

pub struct Service {
    pub config: ServerConfig,
    pub registry: Arc<BlobStorageRegistry>,
    pub image_server: Arc<dyn ImageServer>,
}

impl Service {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let registry = Arc::new(
            BlobStorageRegistry::new(config.blob_storage.clone())
                .context("error initializing blob storage")?,
        );
        let image_server: Arc<dyn ImageServer> = match config.serve_mode {
            ServeMode::Stream => Arc::new(StreamingImageServer::new(registry.clone())),
            ServeMode::Redirect => Arc::new(RedirectImageServer::new(&config.public_url_prefix)),
        };
        Ok(Self {
            config,
            registry,
            image_server,
        })
    }

    pub fn router(&self) -> Router {
        create_routes(RouteState {
            config: Arc::new(self.config.clone()),
            registry: self.registry.clone(),
            image_server: self.image_server.clone(),
        })
    }

    pub async fn start(&self) -> Result<()> {
        let handle = Handle::new();
        let handle_sh = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(handle_sh).await;
            info!("graceful shutdown signal received, shutting down server gracefully");
        });

        let addr: SocketAddr = self.config.listen_addr.parse()?;
        info!("server api listening on {}", self.config.listen_addr);
        axum_server::bind(addr)
            .handle(handle)
            .serve(self.router().into_make_service())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
        },
        _ = terminate => {
        },
    }
    handle.shutdown();
    info!("signal received, shutting down server gracefully");
}
