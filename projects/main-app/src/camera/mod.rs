pub mod constraints;
pub mod ffmpeg_backend;
pub mod jpeg;
pub mod preview;
pub mod service;
pub mod simple;
pub mod snapshot;
pub mod stream;
#[cfg(test)]
pub mod testing;
pub mod traits;
