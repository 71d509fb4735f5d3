//! Codec-agnostic media frames
//!
//! A [`Frame`] is one encoded sample: payload bytes, timestamps, the length of
//! its framing prefix (start code, ADTS header) and a few predicates. The
//! implementations differ only in who owns the bytes:
//!
//! | Type | Bytes | Cacheable |
//! |------|-------|-----------|
//! | [`FrameView`] | borrowed from the caller | never |
//! | [`FrameBuf`] | owned `BytesMut`, reusable | yes |
//! | [`FrameWrapper`] | shared `Bytes` at an offset | yes |
//! | [`CacheableFrame`] | promoted copy or shared original | yes |
//! | [`SubFrame`] | sub-range of a parent frame | if the parent is |
//!
//! Frames move around as `Arc<dyn Frame + 'a>` ([`FramePtr`]). A frame that
//! borrows caller memory can flow through a synchronous call chain, but anything
//! that keeps a frame past the call (merger, GOP cache, channel) must hold a
//! [`SharedFrame`], obtained with [`to_cacheable`].
//!
//! Frames are immutable once wrapped in an `Arc`.

pub mod cacheable;
pub mod owned;
pub mod sub;
pub mod view;
pub mod wrapper;

use std::sync::Arc;

use crate::codec::{h264, h265, CodecId, TrackType};

pub use cacheable::{to_cacheable, CacheableFrame};
pub use owned::FrameBuf;
pub use sub::{split_annexb, split_length_prefixed, SubFrame};
pub use view::FrameView;
pub use wrapper::FrameWrapper;

/// Frame handle that may borrow caller memory for `'a`
pub type FramePtr<'a> = Arc<dyn Frame + 'a>;

/// Frame handle that is safe to keep indefinitely
pub type SharedFrame = Arc<dyn Frame>;

/// Per-frame predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFlags {
    /// Synchronization point (IDR/IRAP)
    pub key_frame: bool,
    /// Parameter set (SPS/PPS/VPS)
    pub config_frame: bool,
    /// Can be discarded without affecting decoding (SEI/AUD)
    pub droppable: bool,
    /// Payload is decodable on its own
    pub decodable: bool,
}

impl Default for FrameFlags {
    fn default() -> Self {
        Self {
            key_frame: false,
            config_frame: false,
            droppable: false,
            decodable: true,
        }
    }
}

impl FrameFlags {
    /// Flags for a parameter-set frame
    pub fn config() -> Self {
        Self {
            config_frame: true,
            decodable: false,
            ..Self::default()
        }
    }

    /// Flags for a decodable key frame
    pub fn key() -> Self {
        Self {
            key_frame: true,
            ..Self::default()
        }
    }

    /// Derive flags from a payload (prefix already stripped)
    ///
    /// Only H.264 and H.265 payloads are inspected; everything else gets the
    /// defaults (not key, not config, decodable).
    pub fn inspect(codec: CodecId, payload: &[u8]) -> Self {
        match codec {
            CodecId::H264 => h264::frame_flags(payload),
            CodecId::H265 => h265::frame_flags(payload),
            _ => Self::default(),
        }
    }
}

/// One encoded media sample
pub trait Frame: Send + Sync {
    /// Frame bytes, including the prefix
    fn data(&self) -> &[u8];

    /// Decode timestamp in milliseconds
    fn dts(&self) -> u32;

    /// Presentation timestamp in milliseconds
    fn pts(&self) -> u32 {
        self.dts()
    }

    /// Length of the framing prefix at the start of [`data`](Self::data)
    ///
    /// 4 for an H.264 `00 00 00 01` start code, 7 for an ADTS header.
    fn prefix_size(&self) -> usize;

    /// Codec of this frame
    fn codec_id(&self) -> CodecId;

    /// Key/config/droppable/decodable predicates
    fn flags(&self) -> FrameFlags;

    /// Whether the frame may be kept after the producing call returns
    fn cacheable(&self) -> bool;

    /// Turn a cacheable frame into a `'static` handle without copying
    ///
    /// Returns `None` for frames that borrow caller memory.
    fn into_shared(self: Arc<Self>) -> Option<SharedFrame>;

    fn size(&self) -> usize {
        self.data().len()
    }

    /// Frame bytes without the prefix
    fn payload(&self) -> &[u8] {
        let data = self.data();
        &data[self.prefix_size().min(data.len())..]
    }

    fn track_type(&self) -> TrackType {
        self.codec_id().track_type()
    }

    fn key_frame(&self) -> bool {
        self.flags().key_frame
    }

    fn config_frame(&self) -> bool {
        self.flags().config_frame
    }

    fn droppable(&self) -> bool {
        self.flags().droppable
    }

    fn decodable(&self) -> bool {
        self.flags().decodable
    }
}

impl std::fmt::Debug for dyn Frame + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("size", &self.size())
            .field("dts", &self.dts())
            .field("pts", &self.pts())
            .field("prefix_size", &self.prefix_size())
            .field("flags", &self.flags())
            .field("cacheable", &self.cacheable())
            .finish()
    }
}

/// Downstream consumer of frames
///
/// Returns whether the frame was accepted.
pub trait FrameWriter: Send + Sync {
    fn input_frame(&self, frame: &FramePtr<'_>) -> bool;
}

/// Adapter turning a closure into a [`FrameWriter`]
pub struct FrameWriterFn<F>(F);

impl<F> FrameWriterFn<F>
where
    F: Fn(&FramePtr<'_>) -> bool + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> FrameWriter for FrameWriterFn<F>
where
    F: Fn(&FramePtr<'_>) -> bool + Send + Sync,
{
    fn input_frame(&self, frame: &FramePtr<'_>) -> bool {
        (self.0)(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags() {
        let flags = FrameFlags::default();
        assert!(!flags.key_frame);
        assert!(!flags.config_frame);
        assert!(!flags.droppable);
        assert!(flags.decodable);
    }

    #[test]
    fn test_inspect_by_codec() {
        let idr = [0x65, 0x88, 0x84];
        assert!(FrameFlags::inspect(CodecId::H264, &idr).key_frame);
        // Same bytes mean nothing to an audio codec
        assert_eq!(FrameFlags::inspect(CodecId::Aac, &idr), FrameFlags::default());
    }

    #[test]
    fn test_payload_strips_prefix() {
        let data = [0, 0, 0, 1, 0x65, 0x88];
        let frame = FrameView::new(CodecId::H264, &data, 40, 0, 4);
        assert_eq!(frame.payload(), &[0x65, 0x88]);
        assert_eq!(frame.size(), 6);
        assert_eq!(frame.track_type(), TrackType::Video);
    }

    #[test]
    fn test_writer_fn() {
        let writer = FrameWriterFn::new(|frame| frame.dts() > 10);
        let data = [1u8, 2, 3];
        let early: FramePtr<'_> = Arc::new(FrameView::new(CodecId::Aac, &data, 5, 0, 0));
        let late: FramePtr<'_> = Arc::new(FrameView::new(CodecId::Aac, &data, 20, 0, 0));
        assert!(!writer.input_frame(&early));
        assert!(writer.input_frame(&late));
    }
}
