use crate::core::base64::{base64_value, DecodeError};
use crate::core::{BitReader, FieldError};
use crate::v1::GPPDecodeError;

pub(crate) const GPP_HEADER: u8 = 3;

/// The decoded header segment of a GPP string.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Header {
    pub version: u8,
    /// Identifiers of the sections following the header, in order.
    pub section_ids: Vec<u16>,
}

/// Rejects header segments which cannot be GPP headers without decoding them.
///
/// `s` is the text before the first `~`. Only its length and its first character, which holds
/// the 6-bit header type, are checked.
pub fn validate_header(s: &str) -> Result<(), GPPDecodeError> {
    let bytes = s.as_bytes();
    if bytes.len() < 4 {
        return Err(GPPDecodeError::TooShort);
    }

    let found = base64_value(bytes[0]).ok_or(DecodeError::InvalidByte(0, bytes[0]))?;
    if found != GPP_HEADER {
        return Err(GPPDecodeError::InvalidHeaderType { found });
    }

    Ok(())
}

/// Decodes the header segment: header type, version, then the list of section identifiers.
pub fn decode_header(s: &str) -> Result<Header, GPPDecodeError> {
    let mut r = BitReader::from_base64(s)?;

    let found = r.read_u6().map_err(|e| FieldError::new("type", e))?;
    if found != GPP_HEADER {
        return Err(GPPDecodeError::InvalidHeaderType { found });
    }

    let version = r.read_u6().map_err(|e| FieldError::new("version", e))?;
    let section_ids = r.read_fibonacci_range()?;

    Ok(Header {
        version,
        section_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bits::TruncatedData;
    use crate::core::range::RangeError;
    use test_case::test_case;

    #[test_case("DBABM" ; "simple")]
    #[test_case("DAAA" ; "minimal")]
    #[test_case("D###" ; "only the type is checked")]
    fn validate(s: &str) {
        assert_eq!(validate_header(s), Ok(()));
    }

    #[test_case("" => GPPDecodeError::TooShort ; "empty")]
    #[test_case("DB" => GPPDecodeError::TooShort ; "short")]
    #[test_case("DBA" => GPPDecodeError::TooShort ; "three characters")]
    #[test_case("AAAA" => GPPDecodeError::InvalidHeaderType { found: 0 } ; "invalid type")]
    #[test_case("CPXxRfAPXxRfAAfKABENB" => GPPDecodeError::InvalidHeaderType { found: 2 } ; "tcf string")]
    #[test_case("=BAB" => GPPDecodeError::Decode(DecodeError::InvalidByte(0, b'=')) ; "invalid character")]
    fn validate_error(s: &str) -> GPPDecodeError {
        validate_header(s).unwrap_err()
    }

    #[test_case("DBABM" => Header { version: 1, section_ids: vec![2] } ; "single section")]
    #[test_case("DBACNY" => Header { version: 1, section_ids: vec![2, 6] } ; "two sections")]
    #[test_case("DBABMA" => Header { version: 1, section_ids: vec![2] } ; "padded")]
    #[test_case("DBACOe" => Header { version: 1, section_ids: vec![2, 5, 6] } ; "span")]
    #[test_case("DBABrGA" => Header { version: 1, section_ids: vec![7, 8, 9, 10, 11, 12] } ; "us sections")]
    #[test_case("DBAA" => Header { version: 1, section_ids: vec![] } ; "no sections")]
    #[test_case("DCAA" => Header { version: 2, section_ids: vec![] } ; "version is not checked")]
    fn decode(s: &str) -> Header {
        decode_header(s).unwrap()
    }

    #[test]
    fn truncated_section_ids() {
        let err = decode_header("DBGBM").unwrap_err();
        assert!(matches!(
            err,
            GPPDecodeError::SectionIds(RangeError::Offset { entry: 1, .. })
        ));
        assert_eq!(
            err.to_string(),
            "error parsing GPP header, section identifiers: error reading an int offset value in a Range(Fibonacci) entry(1): error reading bit 4 of Integer(Fibonacci): expected 1 bit at bit 32, but the byte array was only 4 bytes long"
        );
    }

    #[test]
    fn truncated_count() {
        assert_eq!(
            decode_header("DB"),
            Err(GPPDecodeError::SectionIds(RangeError::Count(TruncatedData {
                bit: 12,
                width: 12,
                len: 2
            })))
        );
    }

    #[test]
    fn truncated_version() {
        assert_eq!(
            decode_header("D").unwrap_err().to_string(),
            "error parsing GPP header, unable to set field version due to parse error: expected 6 bits to start at bit 6, but the byte array was only 1 bytes long"
        );
    }

    #[test_case("AAAA" => GPPDecodeError::InvalidHeaderType { found: 0 } ; "invalid type")]
    #[test_case("DBA#" => GPPDecodeError::Decode(DecodeError::InvalidByte(3, b'#')) ; "invalid character")]
    #[test_case("" => matches GPPDecodeError::Field(_) ; "empty")]
    fn decode_error(s: &str) -> GPPDecodeError {
        decode_header(s).unwrap_err()
    }
}
