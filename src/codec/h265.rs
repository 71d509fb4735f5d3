//! H.265/HEVC payload inspection
//!
//! HEVC NAL headers are two bytes; the type is bits 1..7 of the first byte.
//! Annex B start codes are shared with H.264 (see [`super::h264`]).

use crate::frame::FrameFlags;

/// HEVC NAL unit types the core cares about
pub mod nal {
    pub const BLA_W_LP: u8 = 16;
    pub const CRA_NUT: u8 = 21;
    pub const VPS: u8 = 32;
    pub const SPS: u8 = 33;
    pub const PPS: u8 = 34;
    pub const AUD: u8 = 35;
    pub const SEI_PREFIX: u8 = 39;
    pub const SEI_SUFFIX: u8 = 40;
}

/// NAL unit type from the first header byte
pub fn nal_type(b: u8) -> u8 {
    (b >> 1) & 0x3F
}

/// Frame predicates for one NAL unit (without start code)
pub fn frame_flags(nalu: &[u8]) -> FrameFlags {
    let Some(&first) = nalu.first() else {
        return FrameFlags::default();
    };
    let ty = nal_type(first);

    // VCL NAL units are 0..=31; first_slice_segment_in_pic_flag follows the
    // two-byte header
    let starts_picture = nalu.get(2).is_some_and(|b| b & 0x80 != 0);
    let decodable = ty < nal::VPS && starts_picture;
    let irap = (nal::BLA_W_LP..=nal::CRA_NUT).contains(&ty);

    FrameFlags {
        key_frame: irap && decodable,
        config_frame: matches!(ty, nal::VPS | nal::SPS | nal::PPS),
        droppable: matches!(ty, nal::AUD | nal::SEI_PREFIX | nal::SEI_SUFFIX),
        decodable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nal_type() {
        assert_eq!(nal_type(0x40), nal::VPS);
        assert_eq!(nal_type(0x42), nal::SPS);
        assert_eq!(nal_type(0x44), nal::PPS);
        assert_eq!(nal_type(0x26), 19); // IDR_W_RADL
    }

    #[test]
    fn test_idr_flags() {
        let flags = frame_flags(&[0x26, 0x01, 0xAF]);
        assert!(flags.key_frame);
        assert!(flags.decodable);
        assert!(!flags.config_frame);
    }

    #[test]
    fn test_trailing_slice() {
        // TRAIL_R, first slice of picture
        let flags = frame_flags(&[0x02, 0x01, 0xD0]);
        assert!(flags.decodable);
        assert!(!flags.key_frame);

        // Dependent slice segment of the same picture
        let flags = frame_flags(&[0x02, 0x01, 0x50]);
        assert!(!flags.decodable);
    }

    #[test]
    fn test_config_and_droppable() {
        assert!(frame_flags(&[0x40, 0x01, 0x0C]).config_frame);
        assert!(!frame_flags(&[0x42, 0x01, 0x01]).decodable);
        assert!(frame_flags(&[0x4E, 0x01, 0x05]).droppable);
        assert_eq!(frame_flags(&[]), FrameFlags::default());
    }
}
