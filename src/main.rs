//! Tileworld Client - headless shared-world viewer
//!
//! This is the main entry point for the viewer client. It handles:
//! - The WebSocket connection to the world server
//! - Asynchronous asset loading (world map, avatar frames)
//! - The single-task state/render event loop

use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tileworld_client::app::{ClientEvent, WorldClient};
use tileworld_client::assets::AssetLoader;
use tileworld_client::config::Config;
use tileworld_client::net::transport;
use tileworld_client::render::pipeline::{FramePresenter, NullPresenter};
use tileworld_client::render::surface::Surface;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Tileworld Client");
    info!("Server: {}", config.server_url);
    info!("Viewport: {}x{}", config.viewport_width, config.viewport_height);

    let (event_tx, event_rx) = mpsc::channel::<ClientEvent>(256);

    // The world map starts loading immediately; rendering stays disabled
    // until it is ready.
    let loader = AssetLoader::new(&config.asset_base, event_tx.clone());
    loader.load_world(&config.world_image);

    // Connect and spawn the transport pump
    let outbound = transport::connect(&config.server_url, event_tx).await?;

    let presenter: Box<dyn FramePresenter> = match &config.frame_dump {
        Some(path) => Box::new(PngDumper { path: path.clone() }),
        None => Box::new(NullPresenter),
    };

    let client = WorldClient::new(&config, outbound, loader, presenter);

    tokio::select! {
        _ = client.run(event_rx) => {}
        _ = shutdown_signal() => {}
    }

    info!("Client shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Writes every composed frame to a PNG path for inspection
struct PngDumper {
    path: String,
}

impl FramePresenter for PngDumper {
    fn present(&mut self, surface: &Surface) {
        if let Err(e) = image::save_buffer(
            &self.path,
            surface.data(),
            surface.width(),
            surface.height(),
            image::ExtendedColorType::Rgba8,
        ) {
            warn!(path = %self.path, error = %e, "Frame dump failed");
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
