use bytes::{Bytes, BytesMut};

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];
const MAX_PENDING_BYTES: usize = 4 * 1024 * 1024;

/// Splits a raw MJPEG byte stream (back-to-back JPEG images) into frames.
pub struct MjpegSplitter {
    pending: BytesMut,
}

impl MjpegSplitter {
    pub fn new() -> Self {
        Self {
            pending: BytesMut::with_capacity(64 * 1024),
        }
    }

    /// Feeds a chunk and returns the newest frame completed by it, if any.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Bytes> {
        self.pending.extend_from_slice(chunk);
        if self.pending.len() > MAX_PENDING_BYTES {
            let overflow = self.pending.len() - MAX_PENDING_BYTES;
            let _ = self.pending.split_to(overflow);
        }

        let mut newest = None;
        loop {
            let Some(start) = find(&self.pending, &SOI) else {
                // A marker may straddle two chunks.
                let keep = usize::from(self.pending.last() == Some(&0xFF));
                let discard = self.pending.len() - keep;
                let _ = self.pending.split_to(discard);
                break;
            };

            let Some(end) = find(&self.pending[start + 2..], &EOI).map(|at| start + 2 + at + 2)
            else {
                let _ = self.pending.split_to(start);
                break;
            };

            newest = Some(self.pending.split_to(end).split_off(start).freeze());
        }

        newest
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for MjpegSplitter {
    fn default() -> Self {
        Self::new()
    }
}

fn find(haystack: &[u8], marker: &[u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|pair| pair == marker)
}
