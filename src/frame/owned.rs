//! Self-owned frames
//!
//! [`FrameBuf`] owns its bytes and can be reset and refilled while it is
//! still uniquely held, which lets a producer recycle one allocation per
//! stream.

use std::sync::Arc;

use bytes::BytesMut;

use crate::codec::CodecId;

use super::{Frame, FrameFlags, SharedFrame};

/// Frame backed by its own buffer
#[derive(Debug, Clone)]
pub struct FrameBuf {
    /// Codec of the frame; survives [`clear`](Self::clear)
    pub codec_id: CodecId,
    /// Decode timestamp in milliseconds
    pub dts: u32,
    /// Presentation timestamp in milliseconds (0 = same as dts)
    pub pts: u32,
    /// Length of the framing prefix
    pub prefix_size: usize,
    /// Frame predicates
    pub flags: FrameFlags,
    /// Frame bytes
    pub buffer: BytesMut,
}

impl FrameBuf {
    /// Create an empty frame for `codec_id`
    pub fn new(codec_id: CodecId) -> Self {
        Self::with_capacity(codec_id, 0)
    }

    pub fn with_capacity(codec_id: CodecId, capacity: usize) -> Self {
        Self {
            codec_id,
            dts: 0,
            pts: 0,
            prefix_size: 0,
            flags: FrameFlags::default(),
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Create a frame holding a copy of `data`
    pub fn from_slice(codec_id: CodecId, data: &[u8], dts: u32, pts: u32, prefix_size: usize) -> Self {
        let mut frame = Self::with_capacity(codec_id, data.len());
        frame.assign(data);
        frame.dts = dts;
        frame.pts = pts;
        frame.prefix_size = prefix_size;
        frame
    }

    /// Replace the frame bytes
    pub fn assign(&mut self, data: &[u8]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(data);
    }

    /// Append to the frame bytes
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Reset bytes, timestamps, prefix and flags for reuse
    ///
    /// The codec id is kept: a reused buffer is assumed to stay on the same
    /// stream. The allocation is kept as well.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.prefix_size = 0;
        self.dts = 0;
        self.pts = 0;
        self.flags = FrameFlags::default();
    }
}

impl Frame for FrameBuf {
    fn data(&self) -> &[u8] {
        &self.buffer
    }

    fn dts(&self) -> u32 {
        self.dts
    }

    fn pts(&self) -> u32 {
        if self.pts != 0 {
            self.pts
        } else {
            self.dts
        }
    }

    fn prefix_size(&self) -> usize {
        self.prefix_size
    }

    fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    fn flags(&self) -> FrameFlags {
        self.flags
    }

    fn cacheable(&self) -> bool {
        true
    }

    fn into_shared(self: Arc<Self>) -> Option<SharedFrame> {
        Some(self)
    }
}
