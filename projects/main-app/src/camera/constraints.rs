use serde::Serialize;

pub const HD_WIDTH: u32 = 1280;
pub const HD_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    User,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub facing_mode: FacingMode,
}

/// Constraints passed to [`super::traits::CameraProvider::acquire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: bool,
}

impl MediaConstraints {
    /// Rear camera at whatever resolution the device prefers.
    pub fn environment() -> Self {
        Self {
            video: VideoConstraints {
                width: None,
                height: None,
                facing_mode: FacingMode::Environment,
            },
            audio: false,
        }
    }

    /// Rear camera pinned to 1280x720, no audio.
    pub fn hd_environment() -> Self {
        Self {
            video: VideoConstraints {
                width: Some(HD_WIDTH),
                height: Some(HD_HEIGHT),
                facing_mode: FacingMode::Environment,
            },
            audio: false,
        }
    }

    pub fn video_size(&self) -> Option<(u32, u32)> {
        Some((self.video.width?, self.video.height?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackConstraintSet {
    pub torch: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackConstraints {
    pub advanced: Vec<TrackConstraintSet>,
}

impl TrackConstraints {
    pub fn torch(on: bool) -> Self {
        Self {
            advanced: vec![TrackConstraintSet { torch: Some(on) }],
        }
    }

    pub fn requested_torch(&self) -> Option<bool> {
        self.advanced.iter().rev().find_map(|set| set.torch)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SupportedConstraints {
    pub width: bool,
    pub height: bool,
    pub facing_mode: bool,
    pub torch: bool,
}
