//! Track descriptions and the codec interfaces protocol layers consume
//!
//! A track describes one elementary stream: its codec and, for audio, the
//! sampling parameters. Audio and video parameters are carried as an explicit
//! [`TrackParams`] variant so code that needs them matches once instead of
//! probing the track's type.

use std::fmt;
use std::sync::Arc;

use crate::codec::{CodecId, TrackType};
use crate::dispatcher::FrameDispatcher;
use crate::frame::FrameWriter;

/// Shared track handle
pub type TrackPtr = Arc<dyn Track>;

/// Type-specific track parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackParams {
    Video,
    Audio {
        /// Samples per second
        sample_rate: u32,
        /// Channel count
        channels: u8,
        /// Bits per sample
        sample_bit: u8,
    },
}

impl TrackParams {
    /// Audio parameters with the usual 16-bit sample depth
    pub fn audio(sample_rate: u32, channels: u8) -> Self {
        TrackParams::Audio {
            sample_rate,
            channels,
            sample_bit: 16,
        }
    }

    pub fn track_type(&self) -> TrackType {
        match self {
            TrackParams::Video => TrackType::Video,
            TrackParams::Audio { .. } => TrackType::Audio,
        }
    }
}

/// One elementary stream
pub trait Track: Send + Sync + fmt::Debug {
    fn codec_id(&self) -> CodecId;

    /// Parameters needed to rebuild an equivalent track
    fn params(&self) -> TrackParams;

    fn track_type(&self) -> TrackType {
        self.codec_id().track_type()
    }
}

/// Generic track built by the codec plugins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    codec_id: CodecId,
    params: TrackParams,
    /// RTP payload type, when the track came from SDP
    pub payload_type: Option<u8>,
    /// SDP `a=fmtp` parameters, when present
    pub fmtp: Option<String>,
}

impl MediaTrack {
    pub fn new(codec_id: CodecId, params: TrackParams) -> Self {
        Self {
            codec_id,
            params,
            payload_type: None,
            fmtp: None,
        }
    }

    pub fn video(codec_id: CodecId) -> Self {
        Self::new(codec_id, TrackParams::Video)
    }

    pub fn audio(codec_id: CodecId, sample_rate: u32, channels: u8, sample_bit: u8) -> Self {
        Self::new(
            codec_id,
            TrackParams::Audio {
                sample_rate,
                channels,
                sample_bit,
            },
        )
    }
}

impl Track for MediaTrack {
    fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    fn params(&self) -> TrackParams {
        self.params
    }
}

/// One media description from an SDP session
///
/// Parsing SDP text is left to the SDP layer; this is what it hands over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdpTrack {
    /// Encoding name from `a=rtpmap` (e.g. "H264", "PCMA")
    pub codec_name: String,
    /// RTP payload type
    pub payload_type: u8,
    /// Clock rate from `a=rtpmap`, 0 if absent
    pub sample_rate: u32,
    /// Channel count from `a=rtpmap`, 0 if absent
    pub channels: u8,
    /// Raw `a=fmtp` parameters
    pub fmtp: String,
}

impl SdpTrack {
    pub fn new(codec_name: impl Into<String>, payload_type: u8) -> Self {
        Self {
            codec_name: codec_name.into(),
            payload_type,
            ..Self::default()
        }
    }
}

/// Direction of a codec stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecRole {
    /// Frames in, protocol units out
    Encoder,
    /// Protocol units in, frames out
    Decoder,
}

/// RTP codec stage built by a plugin
///
/// Frames written to the stage are forwarded to its [`output`](Self::output)
/// once processed; packet framing itself belongs to the RTP layer.
pub trait RtpCodec: FrameWriter {
    fn codec_id(&self) -> CodecId;

    fn role(&self) -> CodecRole;

    /// Payload type; decoders learn it from the stream
    fn payload_type(&self) -> Option<u8>;

    /// RTP timestamp clock rate
    fn clock_rate(&self) -> u32;

    /// Downstream writers of this stage
    fn output(&self) -> &FrameDispatcher;
}

/// RTMP codec stage built by a plugin
pub trait RtmpCodec: FrameWriter {
    fn codec_id(&self) -> CodecId;

    fn role(&self) -> CodecRole;

    /// Track the stage was built for
    fn track(&self) -> &TrackPtr;

    /// Downstream writers of this stage
    fn output(&self) -> &FrameDispatcher;
}
