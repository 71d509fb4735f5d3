//! Frames over shared buffers
//!
//! [`FrameWrapper`] attaches frame metadata to a reference-counted `Bytes`
//! buffer received from elsewhere (a demuxer, a socket read). The buffer is
//! never copied.

use std::sync::Arc;

use bytes::Bytes;

use crate::codec::CodecId;

use super::{Frame, FrameFlags, SharedFrame};

/// Frame viewing a shared buffer from `offset` to its end
#[derive(Debug, Clone)]
pub struct FrameWrapper {
    buf: Bytes,
    codec_id: CodecId,
    dts: u32,
    pts: u32,
    prefix_size: usize,
    flags: FrameFlags,
}

impl FrameWrapper {
    /// Wrap `buf[offset..]`
    ///
    /// An offset past the end yields an empty frame.
    pub fn new(
        buf: Bytes,
        codec_id: CodecId,
        dts: u32,
        pts: u32,
        prefix_size: usize,
        offset: usize,
    ) -> Self {
        let offset = offset.min(buf.len());
        Self {
            buf: buf.slice(offset..),
            codec_id,
            dts,
            pts,
            prefix_size,
            flags: FrameFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: FrameFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Derive flags from the payload for H.264/H.265
    pub fn inspected(self) -> Self {
        let flags = FrameFlags::inspect(self.codec_id, self.payload());
        self.with_flags(flags)
    }

    /// The wrapped bytes (from the offset on)
    pub fn bytes(&self) -> &Bytes {
        &self.buf
    }
}

impl Frame for FrameWrapper {
    fn data(&self) -> &[u8] {
        &self.buf
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_at_offset_without_copy() {
        // 2-byte container header, then an Annex B IDR
        let buf = Bytes::from_static(&[0xAA, 0xBB, 0, 0, 0, 1, 0x65, 0x88, 0x84]);
        let frame = FrameWrapper::new(buf.clone(), CodecId::H264, 80, 120, 4, 2).inspected();

        assert_eq!(frame.data(), &buf[2..]);
        assert_eq!(frame.data().as_ptr(), buf[2..].as_ptr());
        assert_eq!(frame.payload(), &[0x65, 0x88, 0x84]);
        assert_eq!(frame.pts(), 120);
        assert!(frame.key_frame());
        assert!(frame.cacheable());
    }

    #[test]
    fn test_offset_past_end() {
        let frame = FrameWrapper::new(Bytes::from_static(&[1, 2]), CodecId::Aac, 0, 0, 0, 10);
        assert!(frame.data().is_empty());
    }
}
