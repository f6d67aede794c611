//! Fibonacci coded integers.
//!
//! A value is the sum of the Fibonacci numbers (1, 2, 3, 5, 8...) whose positions are set in the
//! codeword, the first bit being the weight 1. The codeword ends with the first two consecutive
//! set bits, the last of which carries no weight, so `11` is 1, `011` is 2 and `1011` is 4.
use crate::core::bits::{parse_u1, TruncatedData};
use num_traits::{CheckedAdd, One};
use thiserror::Error;

/// The error type for failures to read a Fibonacci coded integer.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum CodewordError {
    /// The buffer ended before the terminating bits. `bit` is the 1-based position of the failed
    /// read inside the codeword.
    #[error("error reading bit {bit} of Integer(Fibonacci): {source}")]
    Truncated { bit: u64, source: TruncatedData },
    /// The codeword encodes a value too large for 64 bits.
    #[error("Integer(Fibonacci) overflows 64 bits at bit {bit}")]
    Overflow { bit: u64 },
}

/// Iterator over the Fibonacci weights of successive codeword positions.
///
/// Stops once the next weight does not fit in `T`.
pub struct Weights<T> {
    curr: Option<T>,
    next: Option<T>,
}

impl<T> Iterator for Weights<T>
where
    T: CheckedAdd + Copy,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let next = self.curr?.checked_add(&self.next?);

        self.curr = self.next;
        self.next = next;

        self.curr
    }
}

pub fn weights<T>() -> Weights<T>
where
    T: One + Copy,
{
    Weights {
        curr: Some(T::one()),
        next: Some(T::one()),
    }
}

/// Parses the Fibonacci coded integer starting at `bit`.
///
/// Returns the value along with the length of the codeword in bits, so that a caller can commit
/// its own position only once the whole codeword has been read.
pub fn parse_fibonacci(data: &[u8], bit: u64) -> Result<(u64, u64), CodewordError> {
    let mut weights = weights::<u64>();
    let mut total = 0u64;
    let mut last_bit = false;
    let mut len = 0;

    loop {
        let b = parse_u1(data, bit + len).map_err(|source| CodewordError::Truncated {
            bit: len + 1,
            source,
        })? == 1;
        len += 1;

        // two consecutive 1's signal the end of the value
        if last_bit && b {
            break;
        }

        let weight = weights.next();
        if b {
            total = weight
                .and_then(|w| total.checked_add(w))
                .ok_or(CodewordError::Overflow { bit: len })?;
        }
        last_bit = b;
    }

    Ok((total, len))
}
