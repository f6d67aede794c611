use crate::core::base64::DecodeError;
use crate::core::bits::{
    parse_u1, parse_u12, parse_u16, parse_u2, parse_u4, parse_u6, parse_u8, TruncatedData,
};
use crate::core::fibonacci::{parse_fibonacci, CodewordError};
use thiserror::Error;

pub mod base64;
pub mod bits;
pub mod fibonacci;
pub mod range;

/// The error type for reads performed through a [`BitReader`].
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ReadError {
    #[error(transparent)]
    Truncated(#[from] TruncatedData),
    #[error("number of fields must be positive")]
    InvalidCount,
    #[error("cannot seek to bit {bit}, the byte array is only {len} bytes long")]
    SeekOutOfBounds { bit: u64, len: usize },
}

/// A multi-field read which failed after successfully reading some fields.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("{error}")]
pub struct PartialRead {
    /// Values read before the failure.
    pub values: Vec<u8>,
    #[source]
    pub error: ReadError,
}

impl From<PartialRead> for ReadError {
    fn from(p: PartialRead) -> Self {
        p.error
    }
}

/// A read failure, annotated with the name of the field being populated.
///
/// Nested records extend the field path, so a failure deep in a section reads as
/// `core.sensitive_data_processing`.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("unable to set field {field} due to parse error: {source}")]
pub struct FieldError {
    pub field: String,
    pub source: ReadError,
}

impl FieldError {
    pub fn new<E>(field: &str, source: E) -> Self
    where
        E: Into<ReadError>,
    {
        Self {
            field: field.to_string(),
            source: source.into(),
        }
    }

    /// Prefixes the field path with the name of the enclosing field.
    pub fn within(self, parent: &str) -> Self {
        Self {
            field: format!("{parent}.{}", self.field),
            source: self.source,
        }
    }
}

/// Types which can be decoded from a fixed bit layout.
///
/// Usually derived with `#[derive(FromBitReader)]`.
pub trait FromBitReader: Sized {
    fn from_bit_reader(r: &mut BitReader) -> Result<Self, FieldError>;
}

/// A cursor over the bits of a byte buffer.
///
/// All reads are big-endian and MSB-first. A read either succeeds and advances the position by
/// exactly its width, or fails and leaves the position untouched.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BitReader {
    data: Vec<u8>,
    pos: u64,
}

impl BitReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a reader over the bits of a URL-safe, unpadded base64 string.
    pub fn from_base64(s: &str) -> Result<Self, DecodeError> {
        Ok(Self::new(base64::decode(s)?))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Length of the underlying buffer, in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current position, in bits.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining_bits(&self) -> u64 {
        self.bit_len().saturating_sub(self.pos)
    }

    /// Moves the cursor to an absolute bit position, which may be the end of the buffer but not
    /// past it.
    pub fn seek(&mut self, bit: u64) -> Result<(), ReadError> {
        if bit > self.bit_len() {
            return Err(ReadError::SeekOutOfBounds {
                bit,
                len: self.data.len(),
            });
        }
        self.pos = bit;
        Ok(())
    }

    pub fn parse<F>(&mut self) -> Result<F, FieldError>
    where
        F: FromBitReader,
    {
        F::from_bit_reader(self)
    }

    pub fn read_bool(&mut self) -> Result<bool, TruncatedData> {
        self.read_u1().map(|b| b == 1)
    }

    pub fn read_u1(&mut self) -> Result<u8, TruncatedData> {
        self.advance(1, parse_u1(&self.data, self.pos))
    }

    pub fn read_u2(&mut self) -> Result<u8, TruncatedData> {
        self.advance(2, parse_u2(&self.data, self.pos))
    }

    pub fn read_u4(&mut self) -> Result<u8, TruncatedData> {
        self.advance(4, parse_u4(&self.data, self.pos))
    }

    pub fn read_u6(&mut self) -> Result<u8, TruncatedData> {
        self.advance(6, parse_u6(&self.data, self.pos))
    }

    pub fn read_u8(&mut self) -> Result<u8, TruncatedData> {
        self.advance(8, parse_u8(&self.data, self.pos))
    }

    pub fn read_u12(&mut self) -> Result<u16, TruncatedData> {
        self.advance(12, parse_u12(&self.data, self.pos))
    }

    pub fn read_u16(&mut self) -> Result<u16, TruncatedData> {
        self.advance(16, parse_u16(&self.data, self.pos))
    }

    /// Reads `count` consecutive 2-bit values.
    ///
    /// If the buffer ends early, the values read until then are returned within the error.
    pub fn read_two_bit_field(&mut self, count: usize) -> Result<Vec<u8>, PartialRead> {
        if count == 0 {
            return Err(PartialRead {
                values: vec![],
                error: ReadError::InvalidCount,
            });
        }

        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            match self.read_u2() {
                Ok(v) => values.push(v),
                Err(e) => {
                    return Err(PartialRead {
                        values,
                        error: e.into(),
                    });
                }
            }
        }

        Ok(values)
    }

    /// Reads a Fibonacci coded integer. The position only moves once the whole codeword is read.
    pub fn read_fibonacci_integer(&mut self) -> Result<u64, CodewordError> {
        let (value, len) = parse_fibonacci(&self.data, self.pos)?;
        self.pos += len;
        Ok(value)
    }

    fn advance<T>(&mut self, bits: u64, r: Result<T, TruncatedData>) -> Result<T, TruncatedData> {
        if r.is_ok() {
            self.pos += bits;
        }
        r
    }

    fn bit_len(&self) -> u64 {
        self.data.len() as u64 * 8
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use test_case::test_case;

    /// Transform a string of literal binary digits into a vector of bytes.
    /// Zeroes will be appended to fill missing bits.
    pub(crate) fn b(s: &str) -> Vec<u8> {
        let chars = s
            .chars()
            .filter(|&c| c == '1' || c == '0')
            .collect::<Vec<_>>();
        chars
            .chunks(8)
            .map(|c| (8 - c.len(), String::from_iter(c)))
            .map(|(l, s)| u8::from_str_radix(&s, 2).map(|n| n << l))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or(vec![])
    }

    fn r(s: &str) -> BitReader {
        BitReader::new(b(s))
    }

    #[test_case("00000001 00000010 00000011" => vec![1, 2, 3])]
    #[test_case("000000 010000 001000 000011" => vec![1, 2, 3])]
    #[test_case("000000 010000 001000 000011 1000" => vec![1, 2, 3, 128])]
    #[test_case("000000 010000 001000 000011 100" => vec![1, 2, 3, 128])]
    #[test_case("000000 010000 001000 000011 1001" => vec![1, 2, 3, 144])]
    fn bytes(s: &str) -> Vec<u8> {
        b(s)
    }

    #[test]
    fn sequential_reads() {
        let mut reader = r("1 01 1010 101010 00000001 000000000010 0000000000000011 1");

        assert_eq!(reader.read_bool(), Ok(true));
        assert_eq!(reader.read_u2(), Ok(1));
        assert_eq!(reader.read_u4(), Ok(10));
        assert_eq!(reader.read_u6(), Ok(42));
        assert_eq!(reader.read_u8(), Ok(1));
        assert_eq!(reader.read_u12(), Ok(2));
        assert_eq!(reader.read_u16(), Ok(3));
        assert_eq!(reader.read_u1(), Ok(1));
        assert_eq!(reader.position(), 50);
        assert_eq!(reader.remaining_bits(), 6);
    }

    #[test]
    fn failed_read_keeps_position() {
        let mut reader = r("101010 10");
        assert_eq!(reader.read_u6(), Ok(42));

        assert_eq!(
            reader.read_u4(),
            Err(TruncatedData {
                bit: 6,
                width: 4,
                len: 1
            })
        );
        assert_eq!(reader.position(), 6);

        assert_eq!(reader.read_u2(), Ok(2));
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn seek() {
        let mut reader = r("00001111");
        assert_eq!(reader.seek(4), Ok(()));
        assert_eq!(reader.read_u4(), Ok(15));
        assert_eq!(reader.seek(8), Ok(()));
        assert_eq!(
            reader.seek(9),
            Err(ReadError::SeekOutOfBounds { bit: 9, len: 1 })
        );
        assert_eq!(reader.position(), 8);
    }

    #[test_case("01 10 11 00", 4 => vec![1, 2, 3, 0] ; "whole byte")]
    #[test_case("0 01 10 11 00 01 10 11", 7 => vec![1, 2, 3, 0, 1, 2, 3] ; "unaligned")]
    fn read_two_bit_field(s: &str, count: usize) -> Vec<u8> {
        let mut reader = r(s);
        reader.seek(s.starts_with("0 ") as u64).unwrap();
        reader.read_two_bit_field(count).unwrap()
    }

    #[test]
    fn read_two_bit_field_partial() {
        let mut reader = r("000 01 10 1");
        reader.seek(3).unwrap();

        let err = reader.read_two_bit_field(4).unwrap_err();
        assert_eq!(err.values, vec![1, 2]);
        assert_eq!(
            err.error,
            ReadError::Truncated(TruncatedData {
                bit: 7,
                width: 2,
                len: 1
            })
        );
        assert_eq!(reader.position(), 7);
    }

    #[test]
    fn read_two_bit_field_zero_count() {
        let err = r("0101").read_two_bit_field(0).unwrap_err();
        assert!(err.values.is_empty());
        assert_eq!(err.error, ReadError::InvalidCount);
    }

    #[test]
    fn read_fibonacci_integer() {
        let mut reader = r("011 1011 0001");
        assert_eq!(reader.read_fibonacci_integer(), Ok(2));
        assert_eq!(reader.read_fibonacci_integer(), Ok(4));
        assert_eq!(reader.position(), 7);

        assert!(reader.read_fibonacci_integer().is_err());
        assert_eq!(reader.position(), 7);
    }

    #[test]
    fn from_base64() {
        let mut reader = BitReader::from_base64("DBABM").unwrap();
        assert_eq!(reader.len(), 4);
        assert_eq!(reader.read_u6(), Ok(3));
        assert_eq!(reader.read_u6(), Ok(1));
        assert_eq!(reader.read_u12(), Ok(1));

        assert_eq!(
            BitReader::from_base64("DB#"),
            Err(DecodeError::InvalidByte(2, b'#'))
        );
    }

    #[test]
    fn field_error_path() {
        let err = FieldError::new("sale_opt_out", TruncatedData {
            bit: 12,
            width: 2,
            len: 1,
        })
        .within("core");

        assert_eq!(err.field, "core.sale_opt_out");
        assert_eq!(
            err.to_string(),
            "unable to set field core.sale_opt_out due to parse error: expected 2 bits to start at bit 12, but the byte array was only 1 bytes long"
        );
    }
}
