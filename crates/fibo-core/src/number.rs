//! Arbitrary-precision signed integer used for every Fibonacci value.
//!
//! `Number` wraps a `BigInt` and only exposes what the generator, the
//! cache backends and the range counter need: exact addition, total
//! ordering and a lossless decimal string form.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

/// Error returned when a string is not a base-10 integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal number: {input:?}")]
pub struct ParseNumberError {
    input: String,
}

impl ParseNumberError {
    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// An arbitrary-precision signed integer.
///
/// Serialized as its decimal string so persisted values never lose
/// precision.
///
/// # Example
/// ```
/// use fibo_core::Number;
///
/// let a: Number = "354224848179261915075".parse().unwrap();
/// let b = Number::from(1);
/// assert_eq!((&a + &b).to_string(), "354224848179261915076");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Number(BigInt);

impl Number {
    /// The value zero.
    #[must_use]
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// The value one.
    #[must_use]
    pub fn one() -> Self {
        Self(BigInt::from(1u8))
    }

    /// Parse a base-10 string. An optional leading `-` or `+` is accepted;
    /// anything else that is not an ASCII digit is rejected.
    pub fn from_decimal_str(s: &str) -> Result<Self, ParseNumberError> {
        let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseNumberError {
                input: s.to_string(),
            });
        }
        BigInt::parse_bytes(s.as_bytes(), 10)
            .map(Self)
            .ok_or_else(|| ParseNumberError {
                input: s.to_string(),
            })
    }

    /// Render as a base-10 string.
    #[must_use]
    pub fn to_decimal_string(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// Three-way comparison.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// Whether the value is strictly below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Whether the value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Number of decimal digits, ignoring the sign.
    #[must_use]
    pub fn digits(&self) -> usize {
        self.0.magnitude().to_str_radix(10).len()
    }

    /// Number of significant bits of the magnitude.
    #[must_use]
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Borrow the underlying big integer.
    #[must_use]
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Sign of the value.
    #[must_use]
    pub fn sign(&self) -> Sign {
        self.0.sign()
    }

    /// Build a value from an unsigned machine integer.
    ///
    /// `From<i64>` is the only `From` integer conversion, so integer
    /// literals passed to `Number::from` always resolve.
    #[must_use]
    pub fn from_unsigned(value: u64) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl From<Number> for BigInt {
    fn from(value: Number) -> Self {
        value.0
    }
}

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

impl TryFrom<String> for Number {
    type Error = ParseNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_decimal_str(&value)
    }
}

impl From<Number> for String {
    fn from(value: Number) -> Self {
        value.to_decimal_string()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        Number(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Number> for &'a Number {
    type Output = Number;

    fn add(self, rhs: &'a Number) -> Number {
        Number(&self.0 + &rhs.0)
    }
}

/// Accumulator form: mutates only the left-hand side.
impl AddAssign<&Number> for Number {
    fn add_assign(&mut self, rhs: &Number) {
        self.0 += &rhs.0;
    }
}
