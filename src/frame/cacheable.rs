//! Promotion of frames to cacheable frames
//!
//! Anything that holds frames across calls needs frames that own (or share)
//! their bytes. [`CacheableFrame`] provides that for any input:
//! - a cacheable input is kept by reference, extending its lifetime
//! - a borrowed input is deep-copied once into `Bytes`
//!
//! Either way the predicates are copied at promotion time, so the promoted
//! frame answers them without touching the original codec logic.

use std::sync::Arc;

use bytes::Bytes;

use crate::codec::CodecId;

use super::{Frame, FrameFlags, FramePtr, SharedFrame};

#[derive(Debug)]
enum Backing {
    /// Original cacheable frame, shared
    Frame(SharedFrame),
    /// Copied or externally provided bytes
    Bytes(Bytes),
}

/// Frame guaranteed to be safe to keep
#[derive(Debug)]
pub struct CacheableFrame {
    backing: Backing,
    codec_id: CodecId,
    dts: u32,
    pts: u32,
    prefix_size: usize,
    flags: FrameFlags,
}

impl CacheableFrame {
    /// Promote `frame`, sharing it when possible
    pub fn new(frame: &FramePtr<'_>) -> Self {
        Self::promote(frame, false)
    }

    /// Promote `frame` and optionally force the key-frame predicate
    ///
    /// Used when the caller knows a frame is a sync point the codec did not
    /// mark, e.g. the first frame after a configuration change.
    pub fn promote(frame: &FramePtr<'_>, force_key_frame: bool) -> Self {
        let backing = match Arc::clone(frame).into_shared() {
            Some(shared) => Backing::Frame(shared),
            None => Backing::Bytes(Bytes::copy_from_slice(frame.data())),
        };
        Self::from_parts(frame, backing, force_key_frame)
    }

    /// Promote a view over `buf` by taking a reference on `buf` instead of copying
    ///
    /// `frame.data()` must lie inside `buf`; if it does not, the bytes are copied.
    pub fn with_buffer(frame: &FramePtr<'_>, buf: Bytes) -> Self {
        let data = frame.data();
        let start = buf.as_ptr() as usize;
        let ptr = data.as_ptr() as usize;
        let backing = if ptr >= start && ptr + data.len() <= start + buf.len() {
            Backing::Bytes(buf.slice_ref(data))
        } else {
            Backing::Bytes(Bytes::copy_from_slice(data))
        };
        Self::from_parts(frame, backing, false)
    }

    fn from_parts(frame: &FramePtr<'_>, backing: Backing, force_key_frame: bool) -> Self {
        let mut flags = frame.flags();
        flags.key_frame |= force_key_frame;
        Self {
            backing,
            codec_id: frame.codec_id(),
            dts: frame.dts(),
            pts: frame.pts(),
            prefix_size: frame.prefix_size(),
            flags,
        }
    }

    /// Whether the bytes are shared with the original frame
    pub fn is_shared(&self) -> bool {
        matches!(self.backing, Backing::Frame(_))
    }
}

impl Frame for CacheableFrame {
    fn data(&self) -> &[u8] {
        match &self.backing {
            Backing::Frame(frame) => frame.data(),
            Backing::Bytes(bytes) => bytes,
        }
    }

    fn dts(&self) -> u32 {
        self.dts
    }

    fn pts(&self) -> u32 {
        self.pts
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

/// Return a `'static` handle for `frame`
///
/// Cacheable frames are returned as-is (same allocation); borrowed frames are
/// promoted with a copy.
pub fn to_cacheable(frame: &FramePtr<'_>) -> SharedFrame {
    Arc::clone(frame)
        .into_shared()
        .unwrap_or_else(|| Arc::new(CacheableFrame::new(frame)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameBuf, FrameView};

    #[test]
    fn test_promoted_view_outlives_buffer() {
        let promoted = {
            let temp = vec![0u8, 0, 0, 1, 0x65, 0x88, 0x84];
            let view: FramePtr<'_> = Arc::new(
                FrameView::new(CodecId::H264, &temp, 40, 80, 4).with_flags(FrameFlags::key()),
            );
            Arc::new(CacheableFrame::new(&view))
        };

        assert!(!promoted.is_shared());
        assert_eq!(promoted.data(), &[0, 0, 0, 1, 0x65, 0x88, 0x84]);
        assert_eq!(promoted.dts(), 40);
        assert_eq!(promoted.pts(), 80);
        assert_eq!(promoted.prefix_size(), 4);
        assert!(promoted.key_frame());
        assert!(promoted.cacheable());
    }

    #[test]
    fn test_cacheable_input_is_shared_not_copied() {
        let original: FramePtr<'_> =
            Arc::new(FrameBuf::from_slice(CodecId::Aac, &[1, 2, 3, 4], 10, 0, 0));

        let promoted = CacheableFrame::new(&original);

        assert!(promoted.is_shared());
        assert_eq!(promoted.data().as_ptr(), original.data().as_ptr());
        // The promotion holds a reference on the original
        assert_eq!(Arc::strong_count(&original), 2);
    }

    #[test]
    fn test_force_key_frame() {
        let data = [0x41u8, 0x9A];
        let view: FramePtr<'_> = Arc::new(FrameView::new(CodecId::H264, &data, 0, 0, 0));
        assert!(!view.key_frame());

        assert!(CacheableFrame::promote(&view, true).key_frame());
        assert!(!CacheableFrame::promote(&view, false).key_frame());
    }

    #[test]
    fn test_predicates_are_copied() {
        let data = [0x06u8, 0x05];
        let flags = FrameFlags {
            key_frame: false,
            config_frame: true,
            droppable: true,
            decodable: false,
        };
        let view: FramePtr<'_> =
            Arc::new(FrameView::new(CodecId::H264, &data, 0, 0, 0).with_flags(flags));
        assert_eq!(CacheableFrame::new(&view).flags(), flags);
    }

    #[test]
    fn test_with_buffer_references_source() {
        let buf = Bytes::from_static(&[9, 9, 0xFF, 0xF1, 0x50]);
        {
            let view: FramePtr<'_> =
                Arc::new(FrameView::new(CodecId::Aac, &buf[2..], 5, 0, 0));
            let frame = CacheableFrame::with_buffer(&view, buf.clone());
            assert_eq!(frame.data().as_ptr(), buf[2..].as_ptr());
        }

        // Bytes outside the buffer are copied
        let other = [0xFFu8, 0xF1];
        let view: FramePtr<'_> = Arc::new(FrameView::new(CodecId::Aac, &other, 5, 0, 0));
        let frame = CacheableFrame::with_buffer(&view, buf);
        assert_ne!(frame.data().as_ptr(), other.as_ptr());
        assert_eq!(frame.data(), &other);
    }

    #[test]
    fn test_to_cacheable() {
        let original: FramePtr<'_> =
            Arc::new(FrameBuf::from_slice(CodecId::Opus, &[1, 2], 0, 0, 0));
        let shared = to_cacheable(&original);
        // Same allocation, no wrapper
        assert!(std::ptr::addr_eq(Arc::as_ptr(&shared), Arc::as_ptr(&original)));

        let data = [3u8, 4];
        let view: FramePtr<'_> = Arc::new(FrameView::new(CodecId::Opus, &data, 0, 0, 0));
        let shared = to_cacheable(&view);
        assert!(shared.cacheable());
        assert_eq!(shared.data(), &data);
    }
}
