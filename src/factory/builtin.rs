//! Built-in codec plugins
//!
//! One static [`BuiltinPlugin`] per supported codec. They build generic
//! [`MediaTrack`]s, pass-through codec stages, and frames whose prefix length
//! and predicates come from inspecting the payload:
//!
//! - H.264/H.265: Annex B start code as prefix, flags from the NAL header
//! - AAC: ADTS header as prefix
//! - everything else: no prefix, default flags

use std::sync::Arc;

use crate::codec::{aac, h264, CodecId, TrackType};
use crate::dispatcher::FrameDispatcher;
use crate::frame::{Frame, FrameFlags, FramePtr, FrameView, FrameWriter};
use crate::track::{
    CodecRole, MediaTrack, RtmpCodec, RtpCodec, SdpTrack, Track, TrackParams, TrackPtr,
};

use super::{CodecPlugin, CodecRegistry};

/// Plugin for one built-in codec
#[derive(Debug)]
pub struct BuiltinPlugin {
    codec: CodecId,
}

impl BuiltinPlugin {
    const fn new(codec: CodecId) -> Self {
        Self { codec }
    }

    /// RTP clock rate used when nothing more specific is known
    fn default_clock_rate(&self) -> u32 {
        match self.codec {
            CodecId::G711A | CodecId::G711U => 8000,
            CodecId::Opus => 48000,
            CodecId::Aac | CodecId::L16 => 44100,
            CodecId::H264 | CodecId::H265 | CodecId::Vp8 | CodecId::Vp9 | CodecId::Av1 => 90000,
        }
    }

    /// Channel count used when SDP omits it
    fn default_channels(&self) -> u8 {
        match self.codec {
            CodecId::Opus => 2,
            _ => 1,
        }
    }
}

pub static H264: BuiltinPlugin = BuiltinPlugin::new(CodecId::H264);
pub static H265: BuiltinPlugin = BuiltinPlugin::new(CodecId::H265);
pub static AAC: BuiltinPlugin = BuiltinPlugin::new(CodecId::Aac);
pub static G711A: BuiltinPlugin = BuiltinPlugin::new(CodecId::G711A);
pub static G711U: BuiltinPlugin = BuiltinPlugin::new(CodecId::G711U);
pub static OPUS: BuiltinPlugin = BuiltinPlugin::new(CodecId::Opus);
pub static L16: BuiltinPlugin = BuiltinPlugin::new(CodecId::L16);
pub static VP8: BuiltinPlugin = BuiltinPlugin::new(CodecId::Vp8);
pub static VP9: BuiltinPlugin = BuiltinPlugin::new(CodecId::Vp9);
pub static AV1: BuiltinPlugin = BuiltinPlugin::new(CodecId::Av1);

/// Every built-in plugin, in codec order
pub static PLUGINS: [&BuiltinPlugin; 10] = [
    &H264, &H265, &AAC, &G711A, &G711U, &OPUS, &L16, &VP8, &VP9, &AV1,
];

/// Register every built-in plugin
pub fn register_builtins(registry: &mut CodecRegistry) {
    for plugin in PLUGINS {
        registry.register(plugin);
    }
}

impl CodecPlugin for BuiltinPlugin {
    fn codec_id(&self) -> CodecId {
        self.codec
    }

    fn track_from_sdp(&self, sdp: &SdpTrack) -> Option<TrackPtr> {
        let mut track = match self.codec.track_type() {
            TrackType::Video => MediaTrack::video(self.codec),
            _ => {
                let sample_rate = match sdp.sample_rate {
                    0 => self.default_clock_rate(),
                    rate => rate,
                };
                let channels = match sdp.channels {
                    0 => self.default_channels(),
                    channels => channels,
                };
                MediaTrack::audio(self.codec, sample_rate, channels, 16)
            }
        };
        track.payload_type = Some(sdp.payload_type);
        track.fmtp = Some(sdp.fmtp.clone()).filter(|fmtp| !fmtp.is_empty());
        Some(Arc::new(track))
    }

    fn track_from_params(&self, params: TrackParams) -> Option<TrackPtr> {
        if params.track_type() != self.codec.track_type() {
            return None;
        }
        Some(Arc::new(MediaTrack::new(self.codec, params)))
    }

    fn rtp_encoder(&self, payload_type: u8) -> Option<Arc<dyn RtpCodec>> {
        Some(Arc::new(RtpStage {
            codec: self.codec,
            role: CodecRole::Encoder,
            payload_type: Some(payload_type),
            clock_rate: self.default_clock_rate(),
            output: FrameDispatcher::new(),
        }))
    }

    fn rtp_decoder(&self) -> Option<Arc<dyn RtpCodec>> {
        Some(Arc::new(RtpStage {
            codec: self.codec,
            role: CodecRole::Decoder,
            payload_type: None,
            clock_rate: self.default_clock_rate(),
            output: FrameDispatcher::new(),
        }))
    }

    fn rtmp_encoder(&self, track: &TrackPtr) -> Option<Arc<dyn RtmpCodec>> {
        Some(Arc::new(RtmpStage::new(CodecRole::Encoder, track)))
    }

    fn rtmp_decoder(&self, track: &TrackPtr) -> Option<Arc<dyn RtmpCodec>> {
        Some(Arc::new(RtmpStage::new(CodecRole::Decoder, track)))
    }

    fn frame_from_ptr<'a>(&self, data: &'a [u8], dts: u32, pts: u32) -> FramePtr<'a> {
        let prefix_size = match self.codec {
            CodecId::H264 | CodecId::H265 => h264::start_code_len(data),
            CodecId::Aac => aac::adts_header_len(data),
            _ => 0,
        };
        let payload = data.get(prefix_size..).unwrap_or_default();
        let flags = FrameFlags::inspect(self.codec, payload);
        Arc::new(FrameView::new(self.codec, data, dts, pts, prefix_size).with_flags(flags))
    }
}

/// Pass a frame of `codec` to `output`; frames of any other codec are refused
fn forward(codec: CodecId, output: &FrameDispatcher, frame: &FramePtr<'_>) -> bool {
    if frame.codec_id() != codec {
        tracing::debug!(
            expected = %codec,
            actual = %frame.codec_id(),
            "Frame refused by codec stage"
        );
        return false;
    }
    output.dispatch(frame)
}

#[derive(Debug)]
struct RtpStage {
    codec: CodecId,
    role: CodecRole,
    payload_type: Option<u8>,
    clock_rate: u32,
    output: FrameDispatcher,
}

impl FrameWriter for RtpStage {
    fn input_frame(&self, frame: &FramePtr<'_>) -> bool {
        forward(self.codec, &self.output, frame)
    }
}

impl RtpCodec for RtpStage {
    fn codec_id(&self) -> CodecId {
        self.codec
    }

    fn role(&self) -> CodecRole {
        self.role
    }

    fn payload_type(&self) -> Option<u8> {
        self.payload_type
    }

    fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    fn output(&self) -> &FrameDispatcher {
        &self.output
    }
}

#[derive(Debug)]
struct RtmpStage {
    role: CodecRole,
    track: TrackPtr,
    output: FrameDispatcher,
}

impl RtmpStage {
    fn new(role: CodecRole, track: &TrackPtr) -> Self {
        Self {
            role,
            track: Arc::clone(track),
            output: FrameDispatcher::new(),
        }
    }
}

impl FrameWriter for RtmpStage {
    fn input_frame(&self, frame: &FramePtr<'_>) -> bool {
        forward(self.track.codec_id(), &self.output, frame)
    }
}

impl RtmpCodec for RtmpStage {
    fn codec_id(&self) -> CodecId {
        self.track.codec_id()
    }

    fn role(&self) -> CodecRole {
        self.role
    }

    fn track(&self) -> &TrackPtr {
        &self.track
    }

    fn output(&self) -> &FrameDispatcher {
        &self.output
    }
}
