mod app_state;
mod camera;
mod config;
mod core;
mod web;

use std::sync::Arc;

use app_state::AppState;
use camera::{ffmpeg_backend::FfmpegProvider, traits::CameraProvider};
use config::AppConfig;
use tracing::{info, warn};
use tracing_appender::rolling;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env()?;
    let provider = FfmpegProvider::from_config(&config);

    if std::env::args().any(|arg| arg == "--probe-constraints") {
        let supported = provider.supported_constraints().await;
        println!("{}", serde_json::to_string_pretty(&supported)?);
        return Ok(());
    }

    tokio::fs::create_dir_all("logs").await?;
    let file_appender = rolling::daily("logs", "webcam-capture.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .init();

    tokio::fs::create_dir_all("static").await?;

    let state = Arc::new(AppState::new(config.clone(), provider));
    let app = web::routes::build_router(state.clone());

    info!(
        "{} listening on {} (device: {})",
        config.app_name, config.bind_addr, config.camera_device
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.unmount_all().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown requested");
}
