use std::io::Cursor;

use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{RgbImage, codecs::jpeg::JpegEncoder, imageops};
use serde::Serialize;

/// Matches the default quality of a canvas JPEG export.
const JPEG_QUALITY: u8 = 92;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedImage {
    pub data_uri: String,
    pub width: u32,
    pub height: u32,
}

impl CapturedImage {
    pub fn is_empty(&self) -> bool {
        self.data_uri.is_empty()
    }
}

/// Draws an encoded preview frame onto an off-screen canvas at its native
/// size and exports the canvas as a JPEG data URI.
pub fn capture_frame(frame: &[u8]) -> Result<CapturedImage> {
    let decoded = image::load_from_memory(frame)
        .context("failed to decode preview frame")?
        .to_rgb8();
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        bail!("preview frame has no dimensions");
    }

    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, &decoded, 0, 0);

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(&canvas)
        .context("failed to encode snapshot as jpeg")?;

    Ok(CapturedImage {
        data_uri: format!("data:image/jpeg;base64,{}", BASE64.encode(buffer.into_inner())),
        width,
        height,
    })
}
