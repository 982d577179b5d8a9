use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Idle,
    Live,
    Captured,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureStatus {
    pub state: CaptureState,
    pub torch_on: bool,
    pub torch_supported: bool,
    pub has_image: bool,
    pub active_tracks: usize,
    pub generation: u64,
}
