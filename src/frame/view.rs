//! Borrowed frames
//!
//! [`FrameView`] wraps caller memory so existing buffers can enter the
//! pipeline without a copy. It is only valid for the duration of the call;
//! keep it with [`to_cacheable`](super::to_cacheable).

use std::sync::Arc;

use crate::codec::CodecId;
use crate::error::{Error, Result};

use super::{Frame, FrameFlags, SharedFrame};

/// Frame over caller-owned bytes
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    data: &'a [u8],
    dts: u32,
    pts: u32,
    prefix_size: usize,
    codec_id: Option<CodecId>,
    flags: FrameFlags,
}

impl<'a> FrameView<'a> {
    /// Create a view with a known codec
    pub fn new(codec_id: CodecId, data: &'a [u8], dts: u32, pts: u32, prefix_size: usize) -> Self {
        Self::untyped(data, dts, pts, prefix_size).with_codec(codec_id)
    }

    /// Create a view whose codec is set later with [`with_codec`](Self::with_codec)
    pub fn untyped(data: &'a [u8], dts: u32, pts: u32, prefix_size: usize) -> Self {
        Self {
            data,
            dts,
            pts,
            prefix_size,
            codec_id: None,
            flags: FrameFlags::default(),
        }
    }

    pub fn with_codec(mut self, codec_id: CodecId) -> Self {
        self.codec_id = Some(codec_id);
        self
    }

    pub fn with_flags(mut self, flags: FrameFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Codec of this view, or [`Error::InvalidState`] if it was never set
    pub fn try_codec_id(&self) -> Result<CodecId> {
        self.codec_id
            .ok_or(Error::InvalidState("frame view codec id not set"))
    }
}

impl Frame for FrameView<'_> {
    fn data(&self) -> &[u8] {
        self.data
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

    /// # Panics
    ///
    /// Panics if the codec id was never set. Treating an untyped frame as
    /// valid would route its bytes to the wrong codec.
    fn codec_id(&self) -> CodecId {
        match self.try_codec_id() {
            Ok(codec) => codec,
            Err(e) => panic!("{e}"),
        }
    }

    fn flags(&self) -> FrameFlags {
        self.flags
    }

    fn cacheable(&self) -> bool {
        false
    }

    fn into_shared(self: Arc<Self>) -> Option<SharedFrame> {
        None
    }
}
