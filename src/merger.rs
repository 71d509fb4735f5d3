//! Reassembly of compound frames
//!
//! Packetizers hand over one NAL unit at a time, while muxers (FLV, MP4,
//! MPEG-TS) want one buffer per access unit. [`FrameMerger`] collects the
//! units belonging to one presentation moment and emits them as a single
//! buffer in the requested framing.
//!
//! # Framing
//!
//! | Mode | Unit layout |
//! |------|-------------|
//! | [`MergeMode::None`] | frame bytes as received, prefix included |
//! | [`MergeMode::AnnexB`] | `00 00 00 01` + payload |
//! | [`MergeMode::LengthPrefixed`] | 4-byte big-endian length + payload |

use std::collections::VecDeque;

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{h264, CodecId};
use crate::config::{MediaConfig, DEFAULT_MERGER_MAX_CACHED_FRAMES};
use crate::frame::{to_cacheable, Frame, FramePtr, SharedFrame};

/// Framing of merged output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Concatenate frames unchanged
    None,
    /// Annex B start codes (MPEG-TS, RTSP out)
    AnnexB,
    /// AVCC/HVCC length prefixes (FLV, MP4)
    LengthPrefixed,
}

impl MergeMode {
    fn prefixed(&self) -> bool {
        !matches!(self, MergeMode::None)
    }
}

/// Stateful merger of frames sharing a timestamp
///
/// Output is delivered through a callback as `(dts, pts, buffer, has_key_frame)`.
#[derive(Debug)]
pub struct FrameMerger {
    mode: MergeMode,
    have_decodable: bool,
    cache: VecDeque<SharedFrame>,
    max_cached: usize,
    scratch: BytesMut,
}

impl FrameMerger {
    pub fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            have_decodable: false,
            cache: VecDeque::new(),
            max_cached: DEFAULT_MERGER_MAX_CACHED_FRAMES,
            scratch: BytesMut::new(),
        }
    }

    pub fn with_config(mode: MergeMode, config: &MediaConfig) -> Self {
        Self {
            max_cached: config.merger_max_cached_frames.max(1),
            ..Self::new(mode)
        }
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Number of frames waiting for the next flush
    pub fn pending(&self) -> usize {
        self.cache.len()
    }

    /// Add a frame, flushing the pending run first if `frame` starts a new one
    ///
    /// The frame is promoted to a cacheable frame before it is queued.
    /// Returns true once the frame is queued.
    pub fn input_frame<F>(&mut self, frame: &FramePtr<'_>, mut on_output: F) -> bool
    where
        F: FnMut(u32, u32, Bytes, bool),
    {
        if self.will_flush(frame.as_ref()) {
            self.flush(&mut on_output);
        }

        if frame.decodable() {
            self.have_decodable = true;
        }
        self.cache.push_back(to_cacheable(frame));
        true
    }

    /// Emit the pending run, if any
    ///
    /// Call at end of stream; otherwise the last access unit stays queued.
    pub fn flush<F>(&mut self, mut on_output: F)
    where
        F: FnMut(u32, u32, Bytes, bool),
    {
        let Some(back) = self.cache.back() else {
            return;
        };
        let (dts, pts) = (back.dts(), back.pts());

        let mut has_key_frame = false;
        for frame in &self.cache {
            has_key_frame |= frame.key_frame();
            match self.mode {
                MergeMode::None => self.scratch.extend_from_slice(frame.data()),
                MergeMode::AnnexB => {
                    self.scratch.extend_from_slice(&h264::START_CODE);
                    self.scratch.extend_from_slice(frame.payload());
                }
                MergeMode::LengthPrefixed => {
                    let payload = frame.payload();
                    self.scratch.put_u32(payload.len() as u32);
                    self.scratch.extend_from_slice(payload);
                }
            }
        }

        tracing::trace!(
            mode = ?self.mode,
            frames = self.cache.len(),
            dts = dts,
            bytes = self.scratch.len(),
            key_frame = has_key_frame,
            "Merged frames"
        );

        self.cache.clear();
        self.have_decodable = false;
        on_output(dts, pts, self.scratch.split().freeze(), has_key_frame);
    }

    /// Drop the pending run without emitting it
    pub fn clear(&mut self) {
        self.cache.clear();
        self.have_decodable = false;
    }

    fn will_flush(&self, frame: &dyn Frame) -> bool {
        let Some(back) = self.cache.back() else {
            return false;
        };
        let overflow = self.cache.len() > self.max_cached;

        if !self.mode.prefixed() {
            // A prefixed video frame is already a complete access unit
            let prefixed_video = matches!(frame.codec_id(), CodecId::H264 | CodecId::H265)
                && frame.prefix_size() > 0;
            return prefixed_video || back.dts() != frame.dts() || overflow;
        }

        if !self.have_decodable {
            // Parameter sets and SEI stay with the picture that follows them
            return overflow;
        }

        back.dts() != frame.dts() || frame.decodable() || frame.config_frame() || overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::h264::LengthPrefixedUnits;
    use crate::frame::{split_length_prefixed, FrameBuf, FrameFlags, FrameView};
    use std::sync::Arc;

    const SPS: [u8; 7] = [0, 0, 0, 1, 0x67, 0x64, 0x00];
    const PPS: [u8; 6] = [0, 0, 0, 1, 0x68, 0xEE];
    const IDR: [u8; 7] = [0, 0, 0, 1, 0x65, 0x88, 0x84];
    const SLICE: [u8; 6] = [0, 0, 0, 1, 0x41, 0x9A];

    fn nal(data: &[u8], dts: u32) -> FramePtr<'_> {
        let flags = FrameFlags::inspect(CodecId::H264, &data[4..]);
        Arc::new(FrameView::new(CodecId::H264, data, dts, dts, 4).with_flags(flags))
    }

    type Output = Vec<(u32, u32, Bytes, bool)>;

    fn collect(out: &mut Output) -> impl FnMut(u32, u32, Bytes, bool) + '_ {
        move |dts, pts, buf, key| out.push((dts, pts, buf, key))
    }

    #[test]
    fn test_annexb_access_unit() {
        let mut merger = FrameMerger::new(MergeMode::AnnexB);
        let mut out = Output::new();

        for data in [&SPS[..], &PPS, &IDR] {
            assert!(merger.input_frame(&nal(data, 40), collect(&mut out)));
        }
        assert!(out.is_empty());
        merger.flush(collect(&mut out));

        assert_eq!(out.len(), 1);
        let (dts, pts, buf, key) = &out[0];
        assert_eq!((*dts, *pts, *key), (40, 40, true));
        assert_eq!(buf.len(), SPS.len() + PPS.len() + IDR.len());
        assert_eq!(&buf[..7], &SPS);
        assert_eq!(&buf[13..], &IDR);
    }

    #[test]
    fn test_length_prefixed_access_unit() {
        let mut merger = FrameMerger::new(MergeMode::LengthPrefixed);
        let mut out = Output::new();

        for data in [&SPS[..], &PPS, &IDR] {
            merger.input_frame(&nal(data, 0), collect(&mut out));
        }
        merger.flush(collect(&mut out));

        assert_eq!(out.len(), 1);
        let buf = &out[0].2;
        let units: Vec<&[u8]> = LengthPrefixedUnits::new(buf, 4)
            .map(|r| &buf[r.start + 4..r.end])
            .collect();
        assert_eq!(units, vec![&SPS[4..], &PPS[4..], &IDR[4..]]);
    }

    #[test]
    fn test_avcc_to_annexb() {
        // FLV-style compound frame: SPS + PPS + IDR with 4-byte length fields
        let avcc = [
            0, 0, 0, 3, 0x67, 0x64, 0x00, //
            0, 0, 0, 2, 0x68, 0xEE, //
            0, 0, 0, 3, 0x65, 0x88, 0x84,
        ];
        let frame: FramePtr<'_> = Arc::new(FrameBuf::from_slice(CodecId::H264, &avcc, 0, 0, 0));

        let mut merger = FrameMerger::new(MergeMode::AnnexB);
        let mut out = Output::new();
        for unit in split_length_prefixed(&frame, 4) {
            merger.input_frame(&unit, collect(&mut out));
        }
        merger.flush(collect(&mut out));

        assert_eq!(out.len(), 1);
        assert!(out[0].3);
        let expected: Vec<u8> = [&SPS[..], &PPS, &IDR].concat();
        assert_eq!(&out[0].2[..], &expected[..]);
    }

    #[test]
    fn test_flush_on_new_picture() {
        let mut merger = FrameMerger::new(MergeMode::AnnexB);
        let mut out = Output::new();

        merger.input_frame(&nal(&SPS, 0), collect(&mut out));
        merger.input_frame(&nal(&IDR, 0), collect(&mut out));
        // Next picture, new timestamp
        merger.input_frame(&nal(&SLICE, 40), collect(&mut out));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, 0);
        assert!(out[0].3);
        assert_eq!(merger.pending(), 1);

        merger.flush(collect(&mut out));
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].0, 40);
        assert!(!out[1].3);
        assert_eq!(&out[1].2[..], &SLICE);
    }

    #[test]
    fn test_decodable_frame_closes_unit_at_same_timestamp() {
        let mut merger = FrameMerger::new(MergeMode::AnnexB);
        let mut out = Output::new();

        merger.input_frame(&nal(&IDR, 0), collect(&mut out));
        merger.input_frame(&nal(&SLICE, 0), collect(&mut out));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_config_waits_for_picture() {
        let mut merger = FrameMerger::new(MergeMode::AnnexB);
        let mut out = Output::new();

        // No decodable frame yet: even a timestamp change does not flush
        merger.input_frame(&nal(&SPS, 0), collect(&mut out));
        merger.input_frame(&nal(&PPS, 10), collect(&mut out));
        assert!(out.is_empty());
        assert_eq!(merger.pending(), 2);
    }

    #[test]
    fn test_none_mode_passthrough() {
        let mut merger = FrameMerger::new(MergeMode::None);
        let mut out = Output::new();

        let first = [1u8, 2];
        let second = [3u8];
        let a: FramePtr<'_> = Arc::new(FrameView::new(CodecId::Opus, &first, 20, 0, 0));
        let b: FramePtr<'_> = Arc::new(FrameView::new(CodecId::Opus, &second, 20, 0, 0));
        merger.input_frame(&a, collect(&mut out));
        merger.input_frame(&b, collect(&mut out));
        merger.flush(collect(&mut out));

        assert_eq!(out.len(), 1);
        assert_eq!(&out[0].2[..], &[1, 2, 3]);
    }

    #[test]
    fn test_none_mode_prefixed_video_is_complete() {
        let mut merger = FrameMerger::new(MergeMode::None);
        let mut out = Output::new();

        merger.input_frame(&nal(&IDR, 0), collect(&mut out));
        merger.input_frame(&nal(&SLICE, 0), collect(&mut out));

        assert_eq!(out.len(), 1);
        assert_eq!(&out[0].2[..], &IDR);
    }

    #[test]
    fn test_cache_bound() {
        let config = MediaConfig::default().merger_max_cached_frames(2);
        let mut merger = FrameMerger::with_config(MergeMode::AnnexB, &config);
        let mut out = Output::new();

        for _ in 0..3 {
            merger.input_frame(&nal(&SPS, 0), collect(&mut out));
        }
        assert!(out.is_empty());
        // Cache now holds 3 > 2 frames
        merger.input_frame(&nal(&SPS, 0), collect(&mut out));
        assert_eq!(out.len(), 1);
        assert_eq!(merger.pending(), 1);
    }

    #[test]
    fn test_clear() {
        let mut merger = FrameMerger::new(MergeMode::AnnexB);
        let mut out = Output::new();

        merger.input_frame(&nal(&IDR, 0), collect(&mut out));
        merger.clear();
        assert_eq!(merger.pending(), 0);

        merger.flush(collect(&mut out));
        assert!(out.is_empty());

        // Decodable state was reset: a config frame no longer flushes
        merger.input_frame(&nal(&SPS, 0), collect(&mut out));
        merger.input_frame(&nal(&PPS, 0), collect(&mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn test_output_outlives_input() {
        let mut merger = FrameMerger::new(MergeMode::AnnexB);
        let mut out = Output::new();
        {
            let temp = IDR.to_vec();
            merger.input_frame(&nal(&temp, 0), collect(&mut out));
        }
        merger.flush(collect(&mut out));
        assert_eq!(&out[0].2[..], &IDR);
    }
}
