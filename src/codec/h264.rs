//! H.264/AVC payload inspection
//!
//! Frames entering the core carry one NAL unit each, usually in Annex B form
//! (start-code prefixed). The NAL header byte decides the frame predicates:
//!
//! ```text
//! +---+-----+---------+
//! | F | NRI | Type    |   Type 5 = IDR, 7/8 = SPS/PPS, 6/9 = SEI/AUD
//! | 1 |  2  |  5 bits |
//! +---+-----+---------+
//! ```
//!
//! A slice is decodable on its own only when it starts a picture
//! (`first_mb_in_slice == 0`, i.e. the first bit after the NAL header is set).
//! Later slices of the same picture are not, which lets the merger keep them
//! in the same access unit.

use std::ops::Range;

use crate::frame::FrameFlags;

/// 4-byte Annex B start code
pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// NAL unit type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaluType {
    /// Non-IDR slice
    Slice = 1,
    /// Slice data partition A
    SlicePartA = 2,
    /// Slice data partition B
    SlicePartB = 3,
    /// Slice data partition C
    SlicePartC = 4,
    /// IDR slice (keyframe)
    Idr = 5,
    /// Supplemental enhancement information
    Sei = 6,
    /// Sequence parameter set
    Sps = 7,
    /// Picture parameter set
    Pps = 8,
    /// Access unit delimiter
    Aud = 9,
    /// End of sequence
    EndSeq = 10,
    /// End of stream
    EndStream = 11,
    /// Filler data
    Filler = 12,
}

impl NaluType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b & 0x1F {
            1 => Some(NaluType::Slice),
            2 => Some(NaluType::SlicePartA),
            3 => Some(NaluType::SlicePartB),
            4 => Some(NaluType::SlicePartC),
            5 => Some(NaluType::Idr),
            6 => Some(NaluType::Sei),
            7 => Some(NaluType::Sps),
            8 => Some(NaluType::Pps),
            9 => Some(NaluType::Aud),
            10 => Some(NaluType::EndSeq),
            11 => Some(NaluType::EndStream),
            12 => Some(NaluType::Filler),
            _ => None,
        }
    }

    pub fn is_keyframe(&self) -> bool {
        matches!(self, NaluType::Idr)
    }

    pub fn is_parameter_set(&self) -> bool {
        matches!(self, NaluType::Sps | NaluType::Pps)
    }

    pub fn is_slice(&self) -> bool {
        matches!(
            self,
            NaluType::Slice
                | NaluType::SlicePartA
                | NaluType::SlicePartB
                | NaluType::SlicePartC
                | NaluType::Idr
        )
    }

    /// Can be discarded without affecting decoding
    pub fn is_droppable(&self) -> bool {
        matches!(self, NaluType::Sei | NaluType::Aud | NaluType::Filler)
    }
}

/// Length of the Annex B start code at the beginning of `data` (0, 3 or 4)
pub fn start_code_len(data: &[u8]) -> usize {
    match data {
        [0, 0, 0, 1, ..] => 4,
        [0, 0, 1, ..] => 3,
        _ => 0,
    }
}

/// Find the next Annex B start code at or after `from`
///
/// Returns the start code's position and length.
pub fn find_start_code(data: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 {
            match data[i + 2] {
                1 => return Some((i, 3)),
                0 if i + 4 <= data.len() && data[i + 3] == 1 => return Some((i, 4)),
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Frame predicates for one NAL unit (without start code)
pub fn frame_flags(nalu: &[u8]) -> FrameFlags {
    let Some(nalu_type) = nalu.first().copied().and_then(NaluType::from_byte) else {
        return FrameFlags::default();
    };

    let starts_picture = nalu.get(1).is_some_and(|b| b & 0x80 != 0);
    let decodable = nalu_type.is_slice() && starts_picture;

    FrameFlags {
        key_frame: nalu_type.is_keyframe() && decodable,
        config_frame: nalu_type.is_parameter_set(),
        droppable: nalu_type.is_droppable(),
        decodable,
    }
}

/// Iterator over length-prefixed (AVCC) NAL units
///
/// Yields the byte range of each unit, length field included. Iteration stops
/// at the first length that runs past the end of the buffer.
#[derive(Debug, Clone)]
pub struct LengthPrefixedUnits<'a> {
    data: &'a [u8],
    pos: usize,
    length_size: usize,
}

impl<'a> LengthPrefixedUnits<'a> {
    /// `length_size` is the size of each length field (1 to 4 bytes)
    pub fn new(data: &'a [u8], length_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            length_size: length_size.clamp(1, 4),
        }
    }

    /// Size of each length field after clamping
    pub fn length_size(&self) -> usize {
        self.length_size
    }
}

impl Iterator for LengthPrefixedUnits<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let field = self.data.get(start..start + self.length_size)?;
        let len = field.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);

        let end = start + self.length_size + len;
        if end > self.data.len() {
            self.pos = self.data.len();
            return None;
        }
        self.pos = end;
        Some(start..end)
    }
}
