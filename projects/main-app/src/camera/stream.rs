use std::sync::Arc;

use tracing::debug;

use super::traits::VideoTrack;

/// Handle to an acquired camera stream. Owned by exactly one component.
pub struct MediaStream {
    tracks: Vec<Arc<dyn VideoTrack>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Arc<dyn VideoTrack>>) -> Self {
        Self { tracks }
    }

    pub fn first_track(&self) -> Option<&Arc<dyn VideoTrack>> {
        self.tracks.first()
    }

    pub fn active_track_count(&self) -> usize {
        self.tracks.iter().filter(|track| track.is_live()).count()
    }

    pub fn stop(&self) {
        for track in &self.tracks {
            if track.is_live() {
                debug!("stopping track {}", track.label());
            }
            track.stop();
        }
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field(
                "tracks",
                &self.tracks.iter().map(|t| t.label()).collect::<Vec<_>>(),
            )
            .field("active", &self.active_track_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::camera::testing::FakeProvider;
    use crate::camera::{constraints::MediaConstraints, traits::CameraProvider};

    #[tokio::test]
    async fn stop_ends_every_track_and_is_idempotent() {
        let provider = FakeProvider::new();
        let stream = provider
            .acquire(&MediaConstraints::environment())
            .await
            .expect("fake camera should grant access");
        assert_eq!(stream.active_track_count(), 1);

        stream.stop();
        stream.stop();
        assert_eq!(stream.active_track_count(), 0);
        assert_eq!(provider.device().stop_calls(), 2);
    }
}
