use bytes::Bytes;

use super::{stream::MediaStream, traits::FrameReceiver};

/// Where a component's live stream is rendered. Holds the frame feed of the
/// first video track while a stream is bound.
#[derive(Default)]
pub struct PreviewSurface {
    source: Option<FrameReceiver>,
}

impl PreviewSurface {
    pub fn bind(&mut self, stream: &MediaStream) {
        self.source = stream.first_track().map(|track| track.frames());
    }

    pub fn unbind(&mut self) {
        self.source = None;
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    pub fn current_frame(&self) -> Option<Bytes> {
        self.source.as_ref()?.borrow().clone()
    }

    pub fn subscribe(&self) -> Option<FrameReceiver> {
        self.source.clone()
    }
}
