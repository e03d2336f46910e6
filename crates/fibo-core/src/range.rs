//! Counting Fibonacci ordinals whose value falls inside a closed interval.

use crate::error::FiboError;
use crate::number::Number;

/// Count the ordinals `n` with `low <= F(n) <= high`.
///
/// Streams the sequence once, stopping at the first value above `high`.
/// The cache is never consulted. F(1) and F(2) are both 1, so an interval
/// containing 1 counts two ordinals for it.
///
/// An empty interval (`low > high`) counts zero. A negative `high` is
/// rejected.
///
/// ```
/// use fibo_core::{count_ordinals_in_range, Number};
///
/// let n = count_ordinals_in_range(&Number::from(0), &Number::from(10)).unwrap();
/// assert_eq!(n, 7);
/// ```
pub fn count_ordinals_in_range(low: &Number, high: &Number) -> Result<u64, FiboError> {
    if high.is_negative() {
        return Err(FiboError::InvalidArgument(format!(
            "upper bound must be non-negative, got {high}"
        )));
    }
    if low > high {
        return Ok(0);
    }

    let mut count = 0u64;
    let mut f0 = Number::zero();
    let mut f1 = Number::one();
    let mut f2 = Number::one();

    while f0 <= *high {
        if f0 >= *low {
            count += 1;
        }
        f0 = std::mem::replace(&mut f1, f2);
        f2 = &f0 + &f1;
    }

    Ok(count)
}
