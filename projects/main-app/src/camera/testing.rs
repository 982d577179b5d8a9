//! In-memory camera used by unit tests in place of ffmpeg/v4l2.

use std::{
    io::Cursor,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use image::{Rgb, RgbImage, codecs::jpeg::JpegEncoder};
use tokio::sync::watch;

use super::{
    constraints::{MediaConstraints, SupportedConstraints, TrackConstraints},
    stream::MediaStream,
    traits::{CameraProvider, FrameReceiver, VideoTrack},
};

pub fn fake_jpeg(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new(&mut buffer)
        .encode_image(&img)
        .expect("test frame should encode");
    Bytes::from(buffer.into_inner())
}

enum FrameMode {
    Jpeg(u32, u32),
    Corrupt,
    Nothing,
}

pub struct FakeDevice {
    granted: AtomicBool,
    reports_torch: AtomicBool,
    torch_fails: AtomicBool,
    frames: Mutex<FrameMode>,
    torch_applied: Mutex<Vec<bool>>,
    acquisitions: Mutex<Vec<MediaConstraints>>,
    tracks: Mutex<Vec<Arc<FakeTrack>>>,
    stop_calls: AtomicUsize,
}

impl FakeDevice {
    pub fn torch_applied(&self) -> Vec<bool> {
        self.torch_applied.lock().expect("torch log").clone()
    }

    pub fn acquisitions(&self) -> Vec<MediaConstraints> {
        self.acquisitions.lock().expect("acquisition log").clone()
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn live_tracks(&self) -> usize {
        self.tracks
            .lock()
            .expect("track list")
            .iter()
            .filter(|track| track.is_live())
            .count()
    }

    pub fn set_frame_size(&self, width: u32, height: u32) {
        *self.frames.lock().expect("frame mode") = FrameMode::Jpeg(width, height);
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct FakeProvider {
    device: Arc<FakeDevice>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            device: Arc::new(FakeDevice {
                granted: AtomicBool::new(true),
                reports_torch: AtomicBool::new(true),
                torch_fails: AtomicBool::new(false),
                frames: Mutex::new(FrameMode::Jpeg(64, 48)),
                torch_applied: Mutex::new(Vec::new()),
                acquisitions: Mutex::new(Vec::new()),
                tracks: Mutex::new(Vec::new()),
                stop_calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn deny_permission(self) -> Self {
        self.device.set_granted(false);
        self
    }

    pub fn without_torch(self) -> Self {
        self.device.reports_torch.store(false, Ordering::SeqCst);
        self
    }

    pub fn with_failing_torch(self) -> Self {
        self.device.torch_fails.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_frame_size(self, width: u32, height: u32) -> Self {
        self.device.set_frame_size(width, height);
        self
    }

    pub fn with_corrupt_frames(self) -> Self {
        *self.device.frames.lock().expect("frame mode") = FrameMode::Corrupt;
        self
    }

    pub fn without_frames(self) -> Self {
        *self.device.frames.lock().expect("frame mode") = FrameMode::Nothing;
        self
    }

    pub fn device(&self) -> &FakeDevice {
        &self.device
    }
}

#[async_trait]
impl CameraProvider for FakeProvider {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<MediaStream> {
        self.device
            .acquisitions
            .lock()
            .expect("acquisition log")
            .push(constraints.clone());
        if !self.device.granted.load(Ordering::SeqCst) {
            bail!("permission denied");
        }

        let first_frame = match *self.device.frames.lock().expect("frame mode") {
            FrameMode::Jpeg(width, height) => Some(fake_jpeg(width, height)),
            FrameMode::Corrupt => Some(Bytes::from_static(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9])),
            FrameMode::Nothing => None,
        };
        let (frames_tx, _) = watch::channel(first_frame);
        let track = Arc::new(FakeTrack {
            label: "fake camera".to_string(),
            live: AtomicBool::new(true),
            frames_tx,
            device: self.device.clone(),
        });
        self.device
            .tracks
            .lock()
            .expect("track list")
            .push(track.clone());
        let track: Arc<dyn VideoTrack> = track;
        Ok(MediaStream::new(vec![track]))
    }

    async fn supported_constraints(&self) -> SupportedConstraints {
        SupportedConstraints {
            width: true,
            height: true,
            facing_mode: true,
            torch: self.device.reports_torch.load(Ordering::SeqCst),
        }
    }
}

pub struct FakeTrack {
    label: String,
    live: AtomicBool,
    frames_tx: watch::Sender<Option<Bytes>>,
    device: Arc<FakeDevice>,
}

#[async_trait]
impl VideoTrack for FakeTrack {
    fn label(&self) -> &str {
        &self.label
    }

    fn frames(&self) -> FrameReceiver {
        self.frames_tx.subscribe()
    }

    async fn apply_constraints(&self, constraints: &TrackConstraints) -> Result<()> {
        if self.device.torch_fails.load(Ordering::SeqCst) {
            bail!("torch control rejected");
        }
        if let Some(on) = constraints.requested_torch() {
            self.device
                .torch_applied
                .lock()
                .expect("torch log")
                .push(on);
        }
        Ok(())
    }

    fn stop(&self) {
        self.device.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}
