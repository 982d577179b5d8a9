use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::watch;

use super::{
    constraints::{MediaConstraints, SupportedConstraints, TrackConstraints},
    stream::MediaStream,
};

/// Latest encoded (JPEG) frame published by a live track.
pub type FrameReceiver = watch::Receiver<Option<Bytes>>;

#[async_trait]
pub trait CameraProvider: Send + Sync {
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<MediaStream>;
    async fn supported_constraints(&self) -> SupportedConstraints;
}

#[async_trait]
pub trait VideoTrack: Send + Sync {
    fn label(&self) -> &str;
    fn frames(&self) -> FrameReceiver;
    async fn apply_constraints(&self, constraints: &TrackConstraints) -> Result<()>;
    /// Stopping is idempotent.
    fn stop(&self);
    fn is_live(&self) -> bool;
}
