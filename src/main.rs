use std::path::PathBuf;

use ::tracing::error;
use clap::Parser;
use service::Service;

mod config;
mod http_objects;
mod routes;
mod service;
mod serving;
mod tracing;
use tracing::setup_tracing;

#[cfg(test)]
mod testing;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "config file", help = "Path to config file")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => config::ServerConfig::from_path(path.to_str().unwrap()).unwrap(),
        None => config::ServerConfig::default(),
    };

    if let Err(err) = setup_tracing(&config) {
        eprintln!("error setting up tracing: {err:?}");
        return;
    }

    let service = match Service::new(config) {
        Ok(service) => service,
        Err(err) => {
            error!("error creating service: {err:?}");
            return;
        }
    };
    if let Err(err) = service.start().await {
        error!("error starting service: {err:?}");
    }
}
