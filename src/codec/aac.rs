//! AAC ADTS header detection
//!
//! Raw AAC frames handed to the core may carry an ADTS header. The header is
//! the frame's prefix: it is stripped when frames are merged or remuxed.
//!
//! ADTS header:
//! ```text
//! syncword (12) | ID (1) | layer (2) | protection_absent (1)
//! | profile (2) | sampling_frequency_index (4) | private (1)
//! | channel_configuration (3) | ... | aac_frame_length (13) | ...
//! ```
//!
//! The header is 7 bytes, or 9 when a CRC follows (`protection_absent == 0`).

/// Standard sampling frequencies by index
const SAMPLING_FREQUENCIES: [u32; 16] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350, 0, 0,
    0,
];

/// Parsed ADTS header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    /// Audio object type (profile + 1)
    pub audio_object_type: u8,
    /// Sampling frequency in Hz
    pub sample_rate: u32,
    /// Channel configuration (1=mono, 2=stereo, ...)
    pub channels: u8,
    /// Total frame length including header
    pub frame_length: usize,
    /// Header length (7 or 9)
    pub header_len: usize,
}

impl AdtsHeader {
    /// Parse an ADTS header at the start of `data`
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 7 || data[0] != 0xFF || data[1] & 0xF0 != 0xF0 {
            return None;
        }

        let protection_absent = data[1] & 0x01 != 0;
        let profile = (data[2] >> 6) & 0x03;
        let sampling_frequency_index = (data[2] >> 2) & 0x0F;
        let channels = ((data[2] & 0x01) << 2) | ((data[3] >> 6) & 0x03);
        let frame_length = (((data[3] & 0x03) as usize) << 11)
            | ((data[4] as usize) << 3)
            | ((data[5] >> 5) as usize);

        let sample_rate = SAMPLING_FREQUENCIES[sampling_frequency_index as usize];
        if sample_rate == 0 {
            return None;
        }

        let header_len = if protection_absent { 7 } else { 9 };
        if data.len() < header_len || frame_length < header_len {
            return None;
        }

        Some(AdtsHeader {
            audio_object_type: profile + 1,
            sample_rate,
            channels,
            frame_length,
            header_len,
        })
    }
}

/// Length of the ADTS header at the start of `data`, or 0 if there is none
pub fn adts_header_len(data: &[u8]) -> usize {
    AdtsHeader::parse(data).map_or(0, |h| h.header_len)
}
