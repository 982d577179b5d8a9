use std::{
    path::Path,
    process::Stdio,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::{
    io::AsyncReadExt,
    process::{Child, ChildStdout, Command},
    sync::watch,
    time::timeout,
};
use tracing::{debug, info, warn};

use crate::config::AppConfig;

use super::{
    constraints::{FacingMode, MediaConstraints, SupportedConstraints, TrackConstraints},
    jpeg::MjpegSplitter,
    stream::MediaStream,
    traits::{CameraProvider, FrameReceiver, VideoTrack},
};

/// Camera access through `ffmpeg` (v4l2 capture) and `v4l2-ctl` (controls).
#[derive(Debug, Clone)]
pub struct FfmpegProvider {
    environment_device: String,
    user_device: Option<String>,
    input_format: String,
    torch_control: String,
    start_timeout: Duration,
}

impl FfmpegProvider {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            environment_device: config.camera_device.clone(),
            user_device: config.camera_user_device.clone(),
            input_format: config.camera_input_format.clone(),
            torch_control: config.camera_torch_control.clone(),
            start_timeout: config.camera_start_timeout,
        }
    }

    /// Facing mode is a preference: without a user-facing device the
    /// environment device is used.
    fn device_for(&self, facing_mode: FacingMode) -> &str {
        match (facing_mode, &self.user_device) {
            (FacingMode::User, Some(device)) => device,
            _ => &self.environment_device,
        }
    }
}

#[async_trait]
impl CameraProvider for FfmpegProvider {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<MediaStream> {
        if constraints.audio {
            bail!("audio capture is not supported by the v4l2 backend");
        }
        let device = self.device_for(constraints.video.facing_mode);
        if !Path::new(device).exists() {
            bail!("requested device not found: {device}");
        }

        let mut command = Command::new("ffmpeg");
        command.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "v4l2",
            "-input_format",
            &self.input_format,
        ]);
        if let Some((width, height)) = constraints.video_size() {
            command.args(["-video_size", &format!("{width}x{height}")]);
        }
        let mut child = command
            .args(["-i", device, "-f", "mjpeg", "pipe:1"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("failed to spawn ffmpeg capture process")?;
        let stdout = child
            .stdout
            .take()
            .context("missing ffmpeg stdout pipe for capture")?;

        let (frames_tx, frames_rx) = watch::channel(None);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let live = Arc::new(AtomicBool::new(true));
        tokio::spawn(pump_frames(
            child,
            stdout,
            frames_tx,
            cancel_rx,
            live.clone(),
            device.to_owned(),
        ));

        let track = Arc::new(FfmpegTrack {
            label: format!("v4l2:{device}"),
            device: device.to_owned(),
            torch_control: self.torch_control.clone(),
            frames: frames_rx,
            cancel_tx,
            live,
        });

        let mut first_frame = track.frames();
        let outcome = timeout(self.start_timeout, first_frame.wait_for(Option::is_some))
            .await
            .map(|waited| waited.map(|_| ()));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                track.stop();
                bail!("{device} closed before the first frame (permission denied or device busy)");
            }
            Err(_) => {
                track.stop();
                bail!(
                    "{device} produced no frame within {}ms",
                    self.start_timeout.as_millis()
                );
            }
        }

        info!("acquired {device} ({:?})", constraints.video);
        let track: Arc<dyn VideoTrack> = track;
        Ok(MediaStream::new(vec![track]))
    }

    async fn supported_constraints(&self) -> SupportedConstraints {
        let torch = match list_controls(&self.environment_device).await {
            Ok(controls) => controls.iter().any(|name| *name == self.torch_control),
            Err(err) => {
                debug!("control probe failed on {}: {err:#}", self.environment_device);
                false
            }
        };

        SupportedConstraints {
            width: true,
            height: true,
            facing_mode: true,
            torch,
        }
    }
}

async fn pump_frames(
    mut child: Child,
    mut stdout: ChildStdout,
    frames_tx: watch::Sender<Option<Bytes>>,
    mut cancel_rx: watch::Receiver<bool>,
    live: Arc<AtomicBool>,
    device: String,
) {
    let mut buffer = vec![0_u8; 16 * 1024];
    let mut splitter = MjpegSplitter::new();
    loop {
        tokio::select! {
            changed = cancel_rx.changed() => {
                if changed.is_ok() && *cancel_rx.borrow() {
                    debug!("capture on {device} cancelled");
                }
                break;
            }
            read = stdout.read(&mut buffer) => {
                match read {
                    Ok(0) => {
                        warn!("ffmpeg capture on {device} ended");
                        break;
                    }
                    Ok(n) => {
                        if let Some(frame) = splitter.push(&buffer[..n]) {
                            frames_tx.send_replace(Some(frame));
                        }
                    }
                    Err(err) => {
                        warn!("failed to read ffmpeg output for {device}: {err}");
                        break;
                    }
                }
            }
        }
    }

    live.store(false, Ordering::SeqCst);
    debug!(
        "{device} reader done with {} bytes unframed",
        splitter.pending_len()
    );
    if let Err(err) = child.kill().await {
        warn!("failed to kill ffmpeg capture child: {err}");
    }
    if let Err(err) = child.wait().await {
        warn!("failed to wait ffmpeg capture child: {err}");
    }
    info!("capture on {device} released");
}

pub struct FfmpegTrack {
    label: String,
    device: String,
    torch_control: String,
    frames: FrameReceiver,
    cancel_tx: watch::Sender<bool>,
    live: Arc<AtomicBool>,
}

#[async_trait]
impl VideoTrack for FfmpegTrack {
    fn label(&self) -> &str {
        &self.label
    }

    fn frames(&self) -> FrameReceiver {
        self.frames.clone()
    }

    async fn apply_constraints(&self, constraints: &TrackConstraints) -> Result<()> {
        let Some(on) = constraints.requested_torch() else {
            return Ok(());
        };

        let control = format!(
            "--set-ctrl={}={}",
            self.torch_control,
            torch_value(&self.torch_control, on)
        );
        let status = Command::new("v4l2-ctl")
            .args(["-d", &self.device, &control])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .context("failed to execute v4l2-ctl")?;
        if !status.success() {
            bail!("v4l2-ctl {control} exited with {status}");
        }
        Ok(())
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
        let _ = self.cancel_tx.send(true);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

fn torch_value(control: &str, on: bool) -> u8 {
    match (control, on) {
        // V4L2_FLASH_LED_MODE_TORCH
        ("flash_led_mode", true) => 2,
        (_, true) => 1,
        (_, false) => 0,
    }
}

async fn list_controls(device: &str) -> Result<Vec<String>> {
    let output = Command::new("v4l2-ctl")
        .args(["-d", device, "--list-ctrls"])
        .output()
        .await
        .context("failed to execute v4l2-ctl")?;
    if !output.status.success() {
        bail!("v4l2-ctl --list-ctrls exited with {}", output.status);
    }
    Ok(parse_control_names(&String::from_utf8_lossy(&output.stdout)))
}

/// Control lines look like `name 0x00980900 (int) : min=...`.
fn parse_control_names(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let id = parts.next()?;
            id.starts_with("0x").then(|| name.to_owned())
        })
        .collect()
}
