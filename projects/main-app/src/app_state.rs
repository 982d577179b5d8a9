use tokio::sync::Mutex;
use tracing::info;

use crate::{
    camera::{service::WebcamCapture, simple::SimpleWebcam, traits::CameraProvider},
    config::AppConfig,
};

/// Shared by all handlers. Each component sits behind its own async mutex,
/// which is held across camera acquisition so transitions never overlap.
pub struct AppState<P: CameraProvider> {
    pub config: AppConfig,
    pub full: Mutex<WebcamCapture<P>>,
    pub simple: Mutex<SimpleWebcam<P>>,
}

impl<P: CameraProvider + Clone> AppState<P> {
    pub fn new(config: AppConfig, provider: P) -> Self {
        Self {
            config,
            full: Mutex::new(WebcamCapture::new(provider.clone())),
            simple: Mutex::new(SimpleWebcam::new(provider)),
        }
    }
}

impl<P: CameraProvider> AppState<P> {
    pub async fn unmount_all(&self) {
        self.full.lock().await.unmount();
        self.simple.lock().await.unmount();
        info!("{} widgets unmounted", self.config.app_name);
    }
}
