use crate::core::bits::TruncatedData;
use crate::core::fibonacci::CodewordError;
use crate::core::BitReader;
use num_iter::range_inclusive;
use thiserror::Error;

/// The error type for failures to read a Fibonacci range. Entries are numbered from 0.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum RangeError {
    #[error("error reading the entry count of a Range(Fibonacci): {0}")]
    Count(TruncatedData),
    #[error("error reading the range flag in a Range(Fibonacci) entry({entry}): {source}")]
    Flag { entry: u16, source: TruncatedData },
    #[error("error reading an int offset value in a Range(Fibonacci) entry({entry}): {source}")]
    Offset { entry: u16, source: CodewordError },
    #[error("error reading the span end in a Range(Fibonacci) entry({entry}): {source}")]
    SpanEnd { entry: u16, source: CodewordError },
    #[error("identifier overflows 16 bits in a Range(Fibonacci) entry({entry})")]
    Overflow { entry: u16 },
}

impl BitReader {
    /// Reads a list of identifiers encoded as a Fibonacci range.
    ///
    /// A 12-bit entry count is followed by the entries, each one a flag bit then either a single
    /// identifier (flag 0) or an inclusive span (flag 1). A single identifier and the start of a
    /// span are offsets from the last identifier emitted, the end of a span is an offset from
    /// its start. Identifiers are therefore strictly increasing.
    ///
    /// On failure the position is left where it was before the call.
    pub fn read_fibonacci_range(&mut self) -> Result<Vec<u16>, RangeError> {
        let start = self.pos;
        let range = self.read_range_entries();
        if range.is_err() {
            self.pos = start;
        }
        range
    }

    fn read_range_entries(&mut self) -> Result<Vec<u16>, RangeError> {
        let n = self.read_u12().map_err(RangeError::Count)?;
        let mut range = vec![];
        let mut last_id = 0u16;

        for entry in 0..n {
            let is_group = self
                .read_bool()
                .map_err(|source| RangeError::Flag { entry, source })?;
            let offset = self
                .read_fibonacci_integer()
                .map_err(|source| RangeError::Offset { entry, source })?;
            let first = add_offset(last_id, offset, entry)?;

            if is_group {
                let count = self
                    .read_fibonacci_integer()
                    .map_err(|source| RangeError::SpanEnd { entry, source })?;
                let end = add_offset(first, count, entry)?;

                range.extend(range_inclusive(first, end));
                last_id = end;
            } else {
                range.push(first);
                last_id = first;
            }
        }

        Ok(range)
    }
}

fn add_offset(id: u16, offset: u64, entry: u16) -> Result<u16, RangeError> {
    u16::try_from(offset)
        .ok()
        .and_then(|offset| id.checked_add(offset))
        .ok_or(RangeError::Overflow { entry })
}
