//! Enhanced RTMP FourCC codec identifiers
//!
//! E-RTMP signals codecs with a four-character code instead of the 4-bit
//! legacy codec id. In `onMetaData` the FourCC travels either as a string
//! ("hvc1") or as the big-endian u32 value of its bytes.

use std::fmt;

/// Build a big-endian u32 from four ASCII bytes
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

/// Video FourCC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoFourCc {
    /// H.264 ("avc1")
    Avc,
    /// H.265 ("hvc1")
    Hevc,
    /// AV1 ("av01")
    Av1,
    /// VP9 ("vp09")
    Vp9,
    /// VP8 ("vp08")
    Vp8,
}

impl VideoFourCc {
    /// FourCC bytes
    pub const fn as_bytes(&self) -> &'static [u8; 4] {
        match self {
            VideoFourCc::Avc => b"avc1",
            VideoFourCc::Hevc => b"hvc1",
            VideoFourCc::Av1 => b"av01",
            VideoFourCc::Vp9 => b"vp09",
            VideoFourCc::Vp8 => b"vp08",
        }
    }

    /// FourCC as a big-endian u32
    pub const fn as_u32(&self) -> u32 {
        fourcc(self.as_bytes())
    }

    /// Parse from FourCC bytes. "hev1" is accepted as an alias of "hvc1".
    pub fn from_bytes(code: &[u8]) -> Option<Self> {
        match code {
            b"avc1" => Some(VideoFourCc::Avc),
            b"hvc1" | b"hev1" => Some(VideoFourCc::Hevc),
            b"av01" => Some(VideoFourCc::Av1),
            b"vp09" => Some(VideoFourCc::Vp9),
            b"vp08" => Some(VideoFourCc::Vp8),
            _ => None,
        }
    }

    /// Parse from a big-endian u32
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::from_bytes(&value.to_be_bytes())
    }
}

impl fmt::Display for VideoFourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // FourCC bytes are always ASCII
        f.write_str(std::str::from_utf8(self.as_bytes()).unwrap_or("????"))
    }
}
