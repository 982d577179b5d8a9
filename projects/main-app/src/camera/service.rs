use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::core::state::{CaptureState, CaptureStatus};

use super::{
    constraints::{MediaConstraints, TrackConstraints},
    preview::PreviewSurface,
    snapshot::{self, CapturedImage},
    stream::MediaStream,
    traits::{CameraProvider, FrameReceiver},
};

/// Camera widget with start/stop, torch, capture and reset.
///
/// `Idle -> Live` on start, `Live -> Captured` on capture (the stream is
/// released), `Captured -> Idle` on reset. Callers serialize access, so a
/// start can never overlap another start or a stop.
pub struct WebcamCapture<P: CameraProvider> {
    provider: P,
    preview: PreviewSurface,
    state: CaptureState,
    media_stream: Option<MediaStream>,
    captured_image: Option<CapturedImage>,
    torch_on: bool,
    torch_supported: bool,
    mounted: bool,
    generation: u64,
}

impl<P: CameraProvider> WebcamCapture<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            preview: PreviewSurface::default(),
            state: CaptureState::Idle,
            media_stream: None,
            captured_image: None,
            torch_on: false,
            torch_supported: false,
            mounted: false,
            generation: 0,
        }
    }

    /// First render. Starts the camera once per mount; a failed start leaves
    /// the component unmounted so the next render asks again.
    pub async fn mount(&mut self) -> Result<CaptureState> {
        if self.mounted {
            return Ok(self.state);
        }
        let state = self.start().await?;
        self.mounted = true;
        Ok(state)
    }

    pub fn unmount(&mut self) {
        self.stop();
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub async fn start(&mut self) -> Result<CaptureState> {
        if self.media_stream.is_some() {
            debug!("start ignored: webcam already live");
            return Ok(self.state);
        }
        if self.captured_image.is_some() {
            bail!("a captured image is pending; reset before starting the webcam");
        }

        let stream = match self.provider.acquire(&MediaConstraints::environment()).await {
            Ok(stream) => stream,
            Err(err) => {
                self.state = CaptureState::Idle;
                return Err(err.context("error accessing webcam"));
            }
        };

        self.preview.bind(&stream);
        self.media_stream = Some(stream);
        self.generation += 1;
        self.state = CaptureState::Live;

        self.torch_supported = self.switch_torch(false).await;
        info!(
            "webcam live (generation {}, torch supported: {})",
            self.generation, self.torch_supported
        );
        Ok(self.state)
    }

    /// Releases the stream without capturing.
    pub fn stop(&mut self) {
        if let Some(stream) = self.media_stream.take() {
            stream.stop();
            self.preview.unbind();
            self.torch_on = false;
            info!("webcam stopped");
        }
        if self.state != CaptureState::Captured {
            self.state = CaptureState::Idle;
        }
    }

    /// Flips the torch flag and pushes it to the hardware when possible.
    /// Returns whether the hardware accepted it; the flag flips either way.
    pub async fn toggle_torch(&mut self) -> bool {
        self.torch_on = !self.torch_on;
        let applied = self.switch_torch(self.torch_on).await;
        debug!("torch requested {} (applied: {applied})", self.torch_on);
        applied
    }

    async fn switch_torch(&self, on: bool) -> bool {
        let Some(track) = self.media_stream.as_ref().and_then(|s| s.first_track()) else {
            return false;
        };
        if !self.provider.supported_constraints().await.torch {
            return false;
        }

        match track.apply_constraints(&TrackConstraints::torch(on)).await {
            Ok(()) => true,
            Err(err) => {
                debug!("torch constraint rejected by {}: {err:#}", track.label());
                false
            }
        }
    }

    pub fn capture(&mut self) -> Result<CaptureState> {
        if self.media_stream.is_none() {
            bail!("webcam is not live");
        }
        let Some(frame) = self.preview.current_frame() else {
            bail!("no preview frame available yet");
        };

        let image = snapshot::capture_frame(&frame)?;
        info!("captured {}x{} image", image.width, image.height);
        self.captured_image = Some(image);
        self.stop();
        self.state = CaptureState::Captured;
        Ok(self.state)
    }

    /// Safe in any state.
    pub fn reset(&mut self) -> CaptureState {
        self.stop();
        self.captured_image = None;
        self.state = CaptureState::Idle;
        self.state
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn captured_image(&self) -> Option<&CapturedImage> {
        self.captured_image.as_ref()
    }

    pub fn preview_frames(&self) -> Option<FrameReceiver> {
        self.preview.subscribe()
    }

    pub fn torch_on(&self) -> bool {
        self.torch_on
    }

    pub fn torch_supported(&self) -> bool {
        self.torch_supported
    }

    pub fn status(&self) -> CaptureStatus {
        CaptureStatus {
            state: self.state,
            torch_on: self.torch_on,
            torch_supported: self.torch_supported,
            has_image: self.captured_image.is_some(),
            active_tracks: self
                .media_stream
                .as_ref()
                .map_or(0, MediaStream::active_track_count),
            generation: self.generation,
        }
    }
}

impl<P: CameraProvider> Drop for WebcamCapture<P> {
    fn drop(&mut self) {
        if let Some(stream) = self.media_stream.take() {
            stream.stop();
        }
    }
}
