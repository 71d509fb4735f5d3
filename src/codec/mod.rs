//! Codec taxonomy
//!
//! This module provides:
//! - The closed [`CodecId`] enumeration and its [`TrackType`]
//! - SDP codec-name and legacy RTP payload-type resolution
//! - Legacy RTMP codec ids and enhanced-RTMP FourCCs ([`rtmp`], [`fourcc`])
//! - Per-codec payload inspection used to derive frame predicates
//!   ([`h264`], [`h265`], [`aac`])

pub mod aac;
pub mod fourcc;
pub mod h264;
pub mod h265;
pub mod rtmp;

use std::fmt;
use std::str::FromStr;

pub use fourcc::VideoFourCc;
pub use rtmp::{
    amf_from_codec_id, audio_codec_from_amf, codec_id_from_amf, video_codec_from_amf,
    RtmpAudioCodec, RtmpVideoCodec,
};

/// Media track type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackType {
    Video,
    Audio,
    Title,
    Application,
}

impl TrackType {
    /// Lowercase name as used in SDP `m=` lines
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackType::Video => "video",
            TrackType::Audio => "audio",
            TrackType::Title => "title",
            TrackType::Application => "application",
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(TrackType::Video),
            "audio" => Ok(TrackType::Audio),
            "title" => Ok(TrackType::Title),
            "application" => Ok(TrackType::Application),
            _ => Err(()),
        }
    }
}

/// Supported codecs
///
/// The discriminants are stable: they key the codec registry and are embedded
/// in wire-level numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CodecId {
    H264 = 0,
    H265 = 1,
    Aac = 2,
    G711A = 3,
    G711U = 4,
    Opus = 5,
    L16 = 6,
    Vp8 = 7,
    Vp9 = 8,
    Av1 = 9,
}

impl CodecId {
    /// Every supported codec, in numeric order
    pub const ALL: [CodecId; 10] = [
        CodecId::H264,
        CodecId::H265,
        CodecId::Aac,
        CodecId::G711A,
        CodecId::G711U,
        CodecId::Opus,
        CodecId::L16,
        CodecId::Vp8,
        CodecId::Vp9,
        CodecId::Av1,
    ];

    /// Look up a codec by its stable numeric code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }

    /// Stable numeric code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Resolve a codec from an SDP `a=rtpmap` encoding name (case-insensitive)
    pub fn from_sdp_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|codec| codec.name().eq_ignore_ascii_case(name))
    }

    /// Codec name as used in SDP
    pub fn name(&self) -> &'static str {
        match self {
            CodecId::H264 => "H264",
            CodecId::H265 => "H265",
            CodecId::Aac => "mpeg4-generic",
            CodecId::G711A => "PCMA",
            CodecId::G711U => "PCMU",
            CodecId::Opus => "opus",
            CodecId::L16 => "L16",
            CodecId::Vp8 => "VP8",
            CodecId::Vp9 => "VP9",
            CodecId::Av1 => "AV1X",
        }
    }

    /// Track type this codec belongs to
    pub fn track_type(&self) -> TrackType {
        match self {
            CodecId::H264 | CodecId::H265 | CodecId::Vp8 | CodecId::Vp9 | CodecId::Av1 => {
                TrackType::Video
            }
            CodecId::Aac | CodecId::G711A | CodecId::G711U | CodecId::Opus | CodecId::L16 => {
                TrackType::Audio
            }
        }
    }

    /// Check if this is a video codec
    pub fn is_video(&self) -> bool {
        self.track_type() == TrackType::Video
    }

    /// MPEG-TS/PS program stream type, if the codec has one
    pub fn mpeg_stream_type(&self) -> Option<u8> {
        match self {
            CodecId::H264 => Some(0x1b),
            CodecId::H265 => Some(0x24),
            CodecId::Aac => Some(0x0f),
            CodecId::G711A => Some(0x90),
            CodecId::G711U => Some(0x91),
            CodecId::Opus => Some(0x9c),
            CodecId::L16 => None,
            CodecId::Vp8 => Some(0x9d),
            CodecId::Vp9 => Some(0x9e),
            CodecId::Av1 => Some(0x9f),
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static RTP payload type assignment (RFC 3551 table 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpPayloadInfo {
    pub codec: CodecId,
    pub clock_rate: u32,
    pub channels: u8,
}

/// Resolve a codec from a legacy static RTP payload type
///
/// Used when the SDP carries no recognizable encoding name. Dynamic payload
/// types (96-127) carry no codec information and always resolve to `None`.
pub fn codec_from_payload_type(payload_type: u8) -> Option<RtpPayloadInfo> {
    let (codec, clock_rate, channels) = match payload_type {
        0 => (CodecId::G711U, 8000, 1),
        8 => (CodecId::G711A, 8000, 1),
        10 => (CodecId::L16, 44100, 2),
        11 => (CodecId::L16, 44100, 1),
        _ => return None,
    };
    Some(RtpPayloadInfo {
        codec,
        clock_rate,
        channels,
    })
}
