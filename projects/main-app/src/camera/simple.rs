use anyhow::{Result, bail};
use tracing::{debug, info};

use super::{
    constraints::MediaConstraints,
    preview::PreviewSurface,
    snapshot,
    stream::MediaStream,
    traits::{CameraProvider, FrameReceiver},
};

/// Preview plus a single "Capture photo" action. The stream lives as long as
/// the component is mounted; snapshots are taken and then discarded.
pub struct SimpleWebcam<P: CameraProvider> {
    provider: P,
    preview: PreviewSurface,
    media_stream: Option<MediaStream>,
    mounted: bool,
}

impl<P: CameraProvider> SimpleWebcam<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            preview: PreviewSurface::default(),
            media_stream: None,
            mounted: false,
        }
    }

    pub async fn mount(&mut self) -> Result<()> {
        if self.mounted {
            return Ok(());
        }

        let stream = self
            .provider
            .acquire(&MediaConstraints::hd_environment())
            .await?;
        self.preview.bind(&stream);
        self.media_stream = Some(stream);
        self.mounted = true;
        info!("simple webcam live");
        Ok(())
    }

    pub fn unmount(&mut self) {
        if let Some(stream) = self.media_stream.take() {
            stream.stop();
            info!("simple webcam released");
        }
        self.preview.unbind();
        self.mounted = false;
    }

    /// Takes a JPEG snapshot of the preview. The image goes nowhere; the
    /// return value only says whether one was produced.
    pub fn capture(&self) -> Result<bool> {
        let Some(frame) = self.preview.current_frame() else {
            if !self.preview.is_bound() {
                bail!("simple webcam has no stream");
            }
            return Ok(false);
        };

        let image = snapshot::capture_frame(&frame)?;
        debug!(
            "discarding {}x{} snapshot ({} bytes)",
            image.width,
            image.height,
            image.data_uri.len()
        );
        Ok(true)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_live(&self) -> bool {
        self.media_stream
            .as_ref()
            .is_some_and(|stream| stream.active_track_count() > 0)
    }

    pub fn preview_frames(&self) -> Option<FrameReceiver> {
        self.preview.subscribe()
    }
}

impl<P: CameraProvider> Drop for SimpleWebcam<P> {
    fn drop(&mut self) {
        if let Some(stream) = self.media_stream.take() {
            stream.stop();
        }
    }
}
