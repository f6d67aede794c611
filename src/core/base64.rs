use bitstream_io::{BigEndian, BitWrite, BitWriter};
use thiserror::Error;

/// The error type that describes failures to decode Base64 encoded strings.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum DecodeError {
    /// An invalid byte was found in the input. The offset and offending byte are provided.
    #[error("invalid byte {1} at offset {0}")]
    InvalidByte(usize, u8),
}

/// Bit-packed base64 implementation, no padding, using the URL Safe Base64 dictionary.
///
/// Every character contributes exactly 6 bits to the output. If the total is not a multiple of
/// 8, the last byte is filled with zeroes, so that no encoded bit is lost.
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    let mut buffer = Vec::with_capacity(decoded_len(s));

    {
        let mut bw = BitWriter::endian(&mut buffer, BigEndian);

        for (offset, b) in s.bytes().enumerate() {
            let value = base64_value(b).ok_or(DecodeError::InvalidByte(offset, b))?;
            bw.write_unsigned::<6, u8>(value)
                .expect("write into vec should not fail");
        }

        bw.byte_align().expect("write into vec should not fail");
    }

    Ok(buffer)
}

/// Returns the number of bytes [`decode`] produces for `s`, without decoding it.
pub fn decoded_len(s: &str) -> usize {
    (s.len() * 6).div_ceil(8)
}

/// Returns the 6-bit value of a single character of the URL Safe dictionary.
pub(crate) fn base64_value(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'-' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}
