//! Zero-copy sub-range frames
//!
//! Encoders and demuxers often emit compound frames: several NAL units in one
//! buffer, separated by start codes (RTSP, MPEG-TS) or preceded by length
//! fields (FLV, MP4). [`split_annexb`] and [`split_length_prefixed`] cut such a
//! frame into one [`SubFrame`] per NAL unit. Each sub frame keeps its parent
//! alive and exposes only its own range, so splitting never copies.

use std::ops::Range;
use std::sync::Arc;

use crate::codec::{h264, CodecId};
use crate::error::{Error, Result};

use super::{Frame, FrameFlags, FramePtr, SharedFrame};

/// Frame exposing a byte range of a parent frame
pub struct SubFrame<'a> {
    parent: FramePtr<'a>,
    range: Range<usize>,
    prefix_size: usize,
    flags: FrameFlags,
}

impl<'a> SubFrame<'a> {
    /// Create a sub frame over `parent.data()[range]`
    ///
    /// Timestamps and codec are inherited from the parent. Flags default to
    /// [`FrameFlags::default`]; set them with [`with_flags`](Self::with_flags).
    pub fn new(parent: &FramePtr<'a>, range: Range<usize>, prefix_size: usize) -> Result<Self> {
        let len = parent.size();
        if range.start > range.end || range.end > len || prefix_size > range.len() {
            return Err(Error::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }

        Ok(Self {
            parent: Arc::clone(parent),
            range,
            prefix_size,
            flags: FrameFlags::default(),
        })
    }

    pub fn with_flags(mut self, flags: FrameFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The frame this range was cut from
    pub fn parent(&self) -> &FramePtr<'a> {
        &self.parent
    }
}

impl Frame for SubFrame<'_> {
    fn data(&self) -> &[u8] {
        &self.parent.data()[self.range.clone()]
    }

    fn dts(&self) -> u32 {
        self.parent.dts()
    }

    fn pts(&self) -> u32 {
        self.parent.pts()
    }

    fn prefix_size(&self) -> usize {
        self.prefix_size
    }

    fn codec_id(&self) -> CodecId {
        self.parent.codec_id()
    }

    fn flags(&self) -> FrameFlags {
        self.flags
    }

    fn cacheable(&self) -> bool {
        self.parent.cacheable()
    }

    fn into_shared(self: Arc<Self>) -> Option<SharedFrame> {
        let parent = Arc::clone(&self.parent).into_shared()?;
        Some(Arc::new(SubFrame {
            parent,
            range: self.range.clone(),
            prefix_size: self.prefix_size,
            flags: self.flags,
        }))
    }
}

/// Split an Annex B compound frame into one sub frame per NAL unit
///
/// Each sub frame includes its start code as prefix and gets flags from its
/// own NAL header. Bytes before the first start code are dropped. A frame
/// without any start code is returned unchanged.
pub fn split_annexb<'a>(frame: &FramePtr<'a>) -> Vec<FramePtr<'a>> {
    let data = frame.data();
    let codec = frame.codec_id();

    let Some((mut start, mut code_len)) = h264::find_start_code(data, 0) else {
        return vec![Arc::clone(frame)];
    };

    let mut units: Vec<FramePtr<'a>> = Vec::new();
    loop {
        let next = h264::find_start_code(data, start + code_len);
        let end = next.map_or(data.len(), |(pos, _)| pos);

        let flags = FrameFlags::inspect(codec, &data[start + code_len..end]);
        // Ranges come from scanning `data`, so they are always in bounds
        if let Ok(sub) = SubFrame::new(frame, start..end, code_len) {
            units.push(Arc::new(sub.with_flags(flags)));
        }

        match next {
            Some((pos, len)) => {
                start = pos;
                code_len = len;
            }
            None => break,
        }
    }

    tracing::trace!(codec = %codec, units = units.len(), "Split compound frame");
    units
}

/// Split a length-prefixed (AVCC/HVCC) compound frame into one sub frame per NAL unit
///
/// Each sub frame keeps its `length_size`-byte length field as prefix, so
/// merging the units again in Annex B mode rewrites the framing. A frame
/// without any complete unit is returned unchanged; a truncated trailing unit
/// is dropped.
pub fn split_length_prefixed<'a>(frame: &FramePtr<'a>, length_size: usize) -> Vec<FramePtr<'a>> {
    let data = frame.data();
    let codec = frame.codec_id();
    let units = h264::LengthPrefixedUnits::new(data, length_size);
    let prefix = units.length_size();

    let mut split: Vec<FramePtr<'a>> = Vec::new();
    for range in units {
        let flags = FrameFlags::inspect(codec, &data[range.start + prefix..range.end]);
        if let Ok(sub) = SubFrame::new(frame, range, prefix) {
            split.push(Arc::new(sub.with_flags(flags)));
        }
    }

    if split.is_empty() {
        return vec![Arc::clone(frame)];
    }
    tracing::trace!(codec = %codec, units = split.len(), "Split length-prefixed frame");
    split
}
