use iab_gpp_decode_derive::FromBitReader;
#[cfg(feature = "serde")]
use serde::Serialize;

/// Global Privacy Control sub-section.
///
/// It is either sent as a separate '.' delimited segment, or packed directly after the core
/// segment bits.
#[derive(Debug, Clone, Copy, Eq, PartialEq, FromBitReader)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[non_exhaustive]
pub struct GpcSegment {
    /// Always 1 for a GPC sub-section.
    #[gpp(u2)]
    pub subsection_type: u8,
    #[gpp(bool)]
    pub gpc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bits::TruncatedData;
    use crate::core::tests::b;
    use crate::core::{BitReader, FieldError, ReadError};
    use test_case::test_case;

    #[test_case("01 1" => GpcSegment { subsection_type: 1, gpc: true } ; "gpc set")]
    #[test_case("01 0" => GpcSegment { subsection_type: 1, gpc: false } ; "gpc unset")]
    #[test_case("10 1" => GpcSegment { subsection_type: 2, gpc: true } ; "other type")]
    fn parse(s: &str) -> GpcSegment {
        BitReader::new(b(s)).parse().unwrap()
    }

    #[test]
    fn truncated() {
        let mut r = BitReader::new(b("01 0 00000"));
        r.seek(6).unwrap();

        assert_eq!(
            r.parse::<GpcSegment>(),
            Err(FieldError {
                field: "gpc".to_string(),
                source: ReadError::Truncated(TruncatedData {
                    bit: 8,
                    width: 1,
                    len: 1
                })
            })
        );
    }
}
