//! RTMP codec identification
//!
//! Legacy RTMP carries the codec in the low nibble of the first video byte
//! (CodecID) or the high nibble of the first audio byte (SoundFormat). The
//! same numbers appear in `onMetaData` as `videocodecid` / `audiocodecid`.
//! Enhanced RTMP replaces them with FourCCs, which `onMetaData` carries as a
//! string or as the FourCC's u32 value.
//!
//! ```text
//! videocodecid: "avc1" | "hvc1" | 7 | 12 | 0x68766331 | null
//! audiocodecid: "mp4a" | 10 | 7 | 8 | 13 | null
//! ```
//!
//! [`codec_id_from_amf`] and [`amf_from_codec_id`] are deliberately not
//! inverses: "hev1", "hvc1", 12 and the `hvc1` FourCC value all map to H.265,
//! while H.265 maps back to only one of them depending on the enhanced flag.

use crate::amf::AmfValue;

use super::fourcc::VideoFourCc;
use super::{CodecId, TrackType};

/// Legacy RTMP video codec id (plus the FourCC values E-RTMP sends as numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmpVideoCodec {
    /// Sorenson H.263
    SorensonH263,
    /// Screen video
    ScreenVideo,
    /// VP6
    Vp6,
    /// VP6 with alpha
    Vp6Alpha,
    /// Screen video v2
    ScreenVideoV2,
    /// AVC (H.264)
    H264,
    /// HEVC (H.265), non-standard legacy id used by domestic CDNs
    H265,
    /// HEVC by FourCC
    FourCcHevc,
    /// AV1 by FourCC
    FourCcAv1,
    /// VP9 by FourCC
    FourCcVp9,
}

impl RtmpVideoCodec {
    /// Numeric value as carried in `videocodecid`
    pub const fn value(&self) -> u32 {
        match self {
            RtmpVideoCodec::SorensonH263 => 2,
            RtmpVideoCodec::ScreenVideo => 3,
            RtmpVideoCodec::Vp6 => 4,
            RtmpVideoCodec::Vp6Alpha => 5,
            RtmpVideoCodec::ScreenVideoV2 => 6,
            RtmpVideoCodec::H264 => 7,
            RtmpVideoCodec::H265 => 12,
            RtmpVideoCodec::FourCcHevc => VideoFourCc::Hevc.as_u32(),
            RtmpVideoCodec::FourCcAv1 => VideoFourCc::Av1.as_u32(),
            RtmpVideoCodec::FourCcVp9 => VideoFourCc::Vp9.as_u32(),
        }
    }

    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            2 => Some(RtmpVideoCodec::SorensonH263),
            3 => Some(RtmpVideoCodec::ScreenVideo),
            4 => Some(RtmpVideoCodec::Vp6),
            5 => Some(RtmpVideoCodec::Vp6Alpha),
            6 => Some(RtmpVideoCodec::ScreenVideoV2),
            7 => Some(RtmpVideoCodec::H264),
            12 => Some(RtmpVideoCodec::H265),
            _ => match VideoFourCc::from_u32(value)? {
                VideoFourCc::Hevc => Some(RtmpVideoCodec::FourCcHevc),
                VideoFourCc::Av1 => Some(RtmpVideoCodec::FourCcAv1),
                VideoFourCc::Vp9 => Some(RtmpVideoCodec::FourCcVp9),
                VideoFourCc::Avc | VideoFourCc::Vp8 => None,
            },
        }
    }

    /// Codec this id maps to, if supported
    pub fn codec_id(&self) -> Option<CodecId> {
        match self {
            RtmpVideoCodec::H264 => Some(CodecId::H264),
            RtmpVideoCodec::H265 | RtmpVideoCodec::FourCcHevc => Some(CodecId::H265),
            RtmpVideoCodec::FourCcAv1 => Some(CodecId::Av1),
            RtmpVideoCodec::FourCcVp9 => Some(CodecId::Vp9),
            _ => None,
        }
    }
}

/// Legacy RTMP audio SoundFormat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmpAudioCodec {
    /// Linear PCM, platform endian
    LinearPcmPlatform = 0,
    /// ADPCM
    Adpcm = 1,
    /// MP3
    Mp3 = 2,
    /// Linear PCM, little endian
    LinearPcmLe = 3,
    /// G.711 A-law
    G711A = 7,
    /// G.711 mu-law
    G711U = 8,
    /// AAC
    Aac = 10,
    /// Speex
    Speex = 11,
    /// Opus (non-standard, widely deployed)
    Opus = 13,
}

impl RtmpAudioCodec {
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(RtmpAudioCodec::LinearPcmPlatform),
            1 => Some(RtmpAudioCodec::Adpcm),
            2 => Some(RtmpAudioCodec::Mp3),
            3 => Some(RtmpAudioCodec::LinearPcmLe),
            7 => Some(RtmpAudioCodec::G711A),
            8 => Some(RtmpAudioCodec::G711U),
            10 => Some(RtmpAudioCodec::Aac),
            11 => Some(RtmpAudioCodec::Speex),
            13 => Some(RtmpAudioCodec::Opus),
            _ => None,
        }
    }

    /// Codec this format maps to, if supported
    pub fn codec_id(&self) -> Option<CodecId> {
        match self {
            RtmpAudioCodec::Aac => Some(CodecId::Aac),
            RtmpAudioCodec::G711A => Some(CodecId::G711A),
            RtmpAudioCodec::G711U => Some(CodecId::G711U),
            RtmpAudioCodec::Opus => Some(CodecId::Opus),
            _ => None,
        }
    }
}

/// Numeric part of an AMF codec field, if it fits a u32
fn amf_code(value: &AmfValue) -> Option<u32> {
    value.as_integer().and_then(|v| u32::try_from(v).ok())
}

/// Resolve `videocodecid` from `onMetaData`
///
/// Unknown strings and numbers log a warning and yield `None`; null yields
/// `None` silently.
pub fn video_codec_from_amf(value: &AmfValue) -> Option<CodecId> {
    if value.is_null_or_undefined() {
        return None;
    }

    if let Some(s) = value.as_str() {
        return match s {
            "avc1" => Some(CodecId::H264),
            "hev1" | "hvc1" => Some(CodecId::H265),
            _ => {
                tracing::warn!(codec = s, "Unsupported video codec");
                None
            }
        };
    }

    let codec = amf_code(value)
        .and_then(RtmpVideoCodec::from_value)
        .and_then(|c| c.codec_id());
    if codec.is_none() {
        tracing::warn!(codec = ?value, "Unsupported video codec");
    }
    codec
}

/// Resolve `audiocodecid` from `onMetaData`
pub fn audio_codec_from_amf(value: &AmfValue) -> Option<CodecId> {
    if value.is_null_or_undefined() {
        return None;
    }

    if let Some(s) = value.as_str() {
        return match s {
            "mp4a" => Some(CodecId::Aac),
            _ => {
                tracing::warn!(codec = s, "Unsupported audio codec");
                None
            }
        };
    }

    let codec = amf_code(value)
        .and_then(RtmpAudioCodec::from_value)
        .and_then(|c| c.codec_id());
    if codec.is_none() {
        tracing::warn!(codec = ?value, "Unsupported audio codec");
    }
    codec
}

/// Resolve an AMF codec field using the table for `track_type`
///
/// Only video and audio fields carry codecs; other track types yield `None`.
pub fn codec_id_from_amf(value: &AmfValue, track_type: TrackType) -> Option<CodecId> {
    match track_type {
        TrackType::Video => video_codec_from_amf(value),
        TrackType::Audio => audio_codec_from_amf(value),
        TrackType::Title | TrackType::Application => None,
    }
}

/// AMF codec field to advertise for `codec`
///
/// `enhanced` only affects H.265, which is sent as its FourCC value instead
/// of the legacy id 12. Codecs with no RTMP mapping yield [`AmfValue::Null`].
pub fn amf_from_codec_id(codec: CodecId, enhanced: bool) -> AmfValue {
    let value = match codec {
        CodecId::Aac => RtmpAudioCodec::Aac as u32,
        CodecId::H264 => RtmpVideoCodec::H264.value(),
        CodecId::H265 if enhanced => RtmpVideoCodec::FourCcHevc.value(),
        CodecId::H265 => RtmpVideoCodec::H265.value(),
        CodecId::G711A => RtmpAudioCodec::G711A as u32,
        CodecId::G711U => RtmpAudioCodec::G711U as u32,
        CodecId::Opus => RtmpAudioCodec::Opus as u32,
        CodecId::Av1 => RtmpVideoCodec::FourCcAv1.value(),
        CodecId::Vp9 => RtmpVideoCodec::FourCcVp9.value(),
        CodecId::L16 | CodecId::Vp8 => return AmfValue::Null,
    };
    AmfValue::Number(value as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_fourcc_strings() {
        assert_eq!(video_codec_from_amf(&"avc1".into()), Some(CodecId::H264));
        assert_eq!(video_codec_from_amf(&"hev1".into()), Some(CodecId::H265));
        assert_eq!(video_codec_from_amf(&"hvc1".into()), Some(CodecId::H265));
        assert_eq!(video_codec_from_amf(&"vp08".into()), None);
    }

    #[test]
    fn test_audio_fourcc_strings() {
        assert_eq!(audio_codec_from_amf(&"mp4a".into()), Some(CodecId::Aac));
        // Video FourCC is not an audio codec
        assert_eq!(audio_codec_from_amf(&"avc1".into()), None);
    }

    #[test]
    fn test_video_numeric_ids() {
        assert_eq!(video_codec_from_amf(&AmfValue::Number(7.0)), Some(CodecId::H264));
        assert_eq!(video_codec_from_amf(&AmfValue::Number(12.0)), Some(CodecId::H265));
        assert_eq!(
            video_codec_from_amf(&AmfValue::Number(VideoFourCc::Hevc.as_u32() as f64)),
            Some(CodecId::H265)
        );
        assert_eq!(
            video_codec_from_amf(&AmfValue::Number(VideoFourCc::Av1.as_u32() as f64)),
            Some(CodecId::Av1)
        );
        assert_eq!(
            video_codec_from_amf(&AmfValue::Integer(VideoFourCc::Vp9.as_u32() as i32)),
            Some(CodecId::Vp9)
        );
        // Sorenson H.263 is a valid id but not a supported codec
        assert_eq!(video_codec_from_amf(&AmfValue::Number(2.0)), None);
        assert_eq!(video_codec_from_amf(&AmfValue::Number(-1.0)), None);
    }

    #[test]
    fn test_audio_numeric_ids() {
        assert_eq!(audio_codec_from_amf(&AmfValue::Number(10.0)), Some(CodecId::Aac));
        assert_eq!(audio_codec_from_amf(&AmfValue::Number(7.0)), Some(CodecId::G711A));
        assert_eq!(audio_codec_from_amf(&AmfValue::Number(8.0)), Some(CodecId::G711U));
        assert_eq!(audio_codec_from_amf(&AmfValue::Integer(13)), Some(CodecId::Opus));
        assert_eq!(audio_codec_from_amf(&AmfValue::Number(2.0)), None);
    }

    #[test]
    fn test_null_and_other_values() {
        assert_eq!(video_codec_from_amf(&AmfValue::Null), None);
        assert_eq!(audio_codec_from_amf(&AmfValue::Undefined), None);
        assert_eq!(video_codec_from_amf(&AmfValue::Other), None);
    }

    #[test]
    fn test_codec_id_from_amf_uses_track_table() {
        let seven = AmfValue::Number(7.0);
        assert_eq!(codec_id_from_amf(&seven, TrackType::Video), Some(CodecId::H264));
        assert_eq!(codec_id_from_amf(&seven, TrackType::Audio), Some(CodecId::G711A));
        assert_eq!(codec_id_from_amf(&seven, TrackType::Title), None);
    }

    #[test]
    fn test_amf_from_codec_id() {
        assert_eq!(amf_from_codec_id(CodecId::H265, false), AmfValue::Number(12.0));
        assert_eq!(
            amf_from_codec_id(CodecId::H265, true),
            AmfValue::Number(VideoFourCc::Hevc.as_u32() as f64)
        );
        // Enhanced flag only changes H.265
        assert_eq!(amf_from_codec_id(CodecId::H264, true), AmfValue::Number(7.0));
        assert_eq!(amf_from_codec_id(CodecId::H264, false), AmfValue::Number(7.0));
        assert_eq!(amf_from_codec_id(CodecId::Aac, true), AmfValue::Number(10.0));
        assert_eq!(amf_from_codec_id(CodecId::Opus, false), AmfValue::Number(13.0));
        assert_eq!(amf_from_codec_id(CodecId::L16, false), AmfValue::Null);
        assert_eq!(amf_from_codec_id(CodecId::Vp8, true), AmfValue::Null);
    }

    #[test]
    fn test_mapping_is_not_an_inverse() {
        // "hev1" resolves to H.265 but H.265 is advertised as 12
        let codec = video_codec_from_amf(&"hev1".into()).unwrap();
        let back = amf_from_codec_id(codec, false);
        assert_ne!(back, AmfValue::from("hev1"));
        assert_eq!(video_codec_from_amf(&back), Some(CodecId::H265));
    }
}
