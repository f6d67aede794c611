//! Offset-addressed bit field extraction.
//!
//! Every function in this module reads a fixed number of bits from a byte slice, starting at an
//! arbitrary bit index, without keeping any state. Bit 0 is the most significant bit of the
//! first byte, and fields are read MSB-first.
//!
//! These are the primitives behind [`BitReader`](super::BitReader), and are also used directly
//! wherever a decoder needs to look ahead without moving a cursor.
use std::error::Error;
use std::fmt;

/// A read needed more bits than the buffer holds.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TruncatedData {
    /// Index of the first requested bit.
    pub bit: u64,
    /// Number of requested bits.
    pub width: u8,
    /// Length of the buffer, in bytes.
    pub len: usize,
}

impl fmt::Display for TruncatedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 1 {
            write!(f, "expected 1 bit at bit {}", self.bit)?;
        } else {
            write!(f, "expected {} bits to start at bit {}", self.width, self.bit)?;
        }
        write!(f, ", but the byte array was only {} bytes long", self.len)
    }
}

impl Error for TruncatedData {}

pub fn parse_u1(data: &[u8], bit: u64) -> Result<u8, TruncatedData> {
    check_bounds(data, bit, 1)?;
    Ok(window(data, bit, 1))
}

pub fn parse_u2(data: &[u8], bit: u64) -> Result<u8, TruncatedData> {
    check_bounds(data, bit, 2)?;
    Ok(window(data, bit, 2))
}

pub fn parse_u4(data: &[u8], bit: u64) -> Result<u8, TruncatedData> {
    check_bounds(data, bit, 4)?;
    Ok(window(data, bit, 4))
}

pub fn parse_u6(data: &[u8], bit: u64) -> Result<u8, TruncatedData> {
    check_bounds(data, bit, 6)?;
    Ok(window(data, bit, 6))
}

pub fn parse_u8(data: &[u8], bit: u64) -> Result<u8, TruncatedData> {
    check_bounds(data, bit, 8)?;
    Ok(window(data, bit, 8))
}

/// Parses a 12-bit integer as a 4-bit high part followed by an 8-bit low part.
pub fn parse_u12(data: &[u8], bit: u64) -> Result<u16, TruncatedData> {
    check_bounds(data, bit, 12)?;
    let high = window(data, bit, 4);
    let low = window(data, bit + 4, 8);
    Ok(u16::from_be_bytes([high, low]))
}

pub fn parse_u16(data: &[u8], bit: u64) -> Result<u16, TruncatedData> {
    check_bounds(data, bit, 16)?;
    let high = window(data, bit, 8);
    let low = window(data, bit + 8, 8);
    Ok(u16::from_be_bytes([high, low]))
}

/// Fails unless `data` holds every byte touched by the `width` bits starting at `bit`.
fn check_bounds(data: &[u8], bit: u64, width: u8) -> Result<(), TruncatedData> {
    let needed_bytes = bit.saturating_add(u64::from(width)).div_ceil(8);
    if (data.len() as u64) < needed_bytes {
        return Err(TruncatedData {
            bit,
            width,
            len: data.len(),
        });
    }

    Ok(())
}

/// Extracts `width` (1 to 8) bits starting at `bit`. Bounds must have been checked already.
fn window(data: &[u8], bit: u64, width: u8) -> u8 {
    let start = (bit / 8) as usize;
    let offset = (bit % 8) as u8;

    if offset + width <= 8 {
        let mask = ((1u16 << width) - 1) as u8;
        return (data[start] >> (8 - offset - width)) & mask;
    }

    // the window spans two bytes: the tail of the first one holds the high bits,
    // the head of the second one holds the `needed` remaining low bits
    let needed = offset + width - 8;
    let tail = data[start] & (0xff >> offset);
    let head = data[start + 1] >> (8 - needed);

    (tail << needed) | head
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const BUFFER: [u8; 16] = [
        0xa5, 0x3c, 0x0f, 0xf0, 0x96, 0x69, 0x01, 0x80, 0x7e, 0xd3, 0x2b, 0xc4, 0x55, 0xaa, 0xff,
        0x00,
    ];

    type Parser = fn(&[u8], u64) -> Result<u16, TruncatedData>;

    fn parsers() -> [(u8, Parser); 7] {
        [
            (1, |d, b| parse_u1(d, b).map(u16::from)),
            (2, |d, b| parse_u2(d, b).map(u16::from)),
            (4, |d, b| parse_u4(d, b).map(u16::from)),
            (6, |d, b| parse_u6(d, b).map(u16::from)),
            (8, |d, b| parse_u8(d, b).map(u16::from)),
            (12, parse_u12),
            (16, parse_u16),
        ]
    }

    /// Reference extraction: widen the whole buffer into one integer, then shift and mask.
    fn oracle(data: &[u8; 16], bit: u64, width: u8) -> u16 {
        let wide = u128::from_be_bytes(*data);
        let shift = 128 - bit as u32 - u32::from(width);
        ((wide >> shift) & ((1u128 << width) - 1)) as u16
    }

    #[test]
    fn every_width_at_every_offset_matches_oracle() {
        for (width, parse) in parsers() {
            for bit in 0..=(128 - u64::from(width)) {
                assert_eq!(
                    parse(&BUFFER, bit).unwrap(),
                    oracle(&BUFFER, bit, width),
                    "width {width} at bit {bit}"
                );
            }
        }
    }

    #[test]
    fn every_width_fails_past_the_end() {
        for (width, parse) in parsers() {
            for bit in (128 - u64::from(width) + 1)..=130 {
                assert_eq!(
                    parse(&BUFFER, bit).unwrap_err(),
                    TruncatedData {
                        bit,
                        width,
                        len: 16
                    },
                    "width {width} at bit {bit}"
                );
            }
        }
    }

    #[test_case(&[0b1000_0000], 0 => 1 ; "first bit")]
    #[test_case(&[0b0000_0001], 7 => 1 ; "last bit")]
    #[test_case(&[0b1111_1110], 7 => 0 ; "last bit unset")]
    fn u1(data: &[u8], bit: u64) -> u8 {
        parse_u1(data, bit).unwrap()
    }

    #[test_case(&[0b0000_0001, 0b1000_0000], 7 => 3 ; "across bytes")]
    #[test_case(&[0b0000_0001, 0b0000_0000], 7 => 2 ; "high bit only")]
    #[test_case(&[0b0000_0000, 0b1000_0000], 7 => 1 ; "low bit only")]
    fn u2(data: &[u8], bit: u64) -> u8 {
        parse_u2(data, bit).unwrap()
    }

    #[test_case(&[0b0000_0110, 0b1000_0000], 5 => 0b1101 ; "across bytes")]
    #[test_case(&[0b0011_1100], 2 => 0b1111 ; "inside byte")]
    fn u4(data: &[u8], bit: u64) -> u8 {
        parse_u4(data, bit).unwrap()
    }

    #[test_case(&[0b0000_1100], 0 => 3 ; "header type")]
    #[test_case(&[0b0000_1100, 0b0001_0000], 6 => 1 ; "header version")]
    #[test_case(&[0b1111_1111, 0b1111_1111], 7 => 63 ; "all set")]
    fn u6(data: &[u8], bit: u64) -> u8 {
        parse_u6(data, bit).unwrap()
    }

    #[test_case(&[0x12, 0x34, 0x56], 4 => 0x234 ; "nibble aligned")]
    #[test_case(&[0x0c, 0x10, 0x02], 12 => 2 ; "header count")]
    fn u12(data: &[u8], bit: u64) -> u16 {
        parse_u12(data, bit).unwrap()
    }

    #[test]
    fn error_message() {
        assert_eq!(
            parse_u1(&[0; 4], 32).unwrap_err().to_string(),
            "expected 1 bit at bit 32, but the byte array was only 4 bytes long"
        );
        assert_eq!(
            parse_u2(&[0; 4], 32).unwrap_err().to_string(),
            "expected 2 bits to start at bit 32, but the byte array was only 4 bytes long"
        );
    }

    #[test]
    fn empty_buffer() {
        assert_eq!(
            parse_u1(&[], 0),
            Err(TruncatedData {
                bit: 0,
                width: 1,
                len: 0
            })
        );
    }

    #[test]
    fn huge_offset_does_not_wrap() {
        assert!(parse_u16(&BUFFER, u64::MAX - 3).is_err());
    }
}
