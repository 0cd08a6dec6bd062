// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use bitflags::bitflags;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use num_traits::Zero;
use std::cmp::Ordering;
use std::ops::Mul;
use std::ops::MulAssign;
use std::ops::Neg;

mod compare;
mod error;
mod extended;
mod fast_integer;
mod fixed_width;
mod machine;
mod rational;

#[cfg(test)]
mod test_cases;

pub use error::Error;
pub use error::Result;
pub use extended::Binary;
pub use extended::Decimal;
pub use extended::EDecimal;
pub use extended::EFloat;
pub use extended::Extended;
pub use extended::Radix;
pub use fast_integer::FastInteger;
pub use fixed_width::FixedDecimal;
pub use machine::MachineFormat;
pub use rational::ERational;

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Sign {
    Positive = 0,
    Negative = 1,
}

impl Sign {
    pub fn from_negative(negative: bool) -> Self {
        if negative {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }
    pub fn is_negative(self) -> bool {
        self == Sign::Negative
    }
    /// flips `ordering` for negative values, which order by decreasing magnitude
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Sign::Positive => ordering,
            Sign::Negative => ordering.reverse(),
        }
    }
}

impl Neg for Sign {
    type Output = Self;
    fn neg(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

impl Mul for Sign {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        match self {
            Self::Positive => rhs,
            Self::Negative => -rhs,
        }
    }
}

impl MulAssign for Sign {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u32)]
pub enum RoundingMode {
    TiesToEven = 0,
    TowardZero = 1,
    TowardNegative = 2,
    TowardPositive = 3,
    TiesToAway = 4,
}

impl Default for RoundingMode {
    fn default() -> Self {
        RoundingMode::TiesToEven
    }
}

impl RoundingMode {
    /// decides whether an inexact truncated magnitude is rounded away from zero.
    ///
    /// `half_cmp` is the discarded fraction compared against one half.
    pub fn rounds_away_from_zero(
        self,
        sign: Sign,
        half_cmp: Ordering,
        truncated_is_odd: bool,
    ) -> bool {
        match (self, sign) {
            (RoundingMode::TiesToEven, _) | (RoundingMode::TiesToAway, _) => match half_cmp {
                Ordering::Less => false,
                Ordering::Equal => self == RoundingMode::TiesToAway || truncated_is_odd,
                Ordering::Greater => true,
            },
            (RoundingMode::TowardZero, _) => false,
            (RoundingMode::TowardNegative, Sign::Negative)
            | (RoundingMode::TowardPositive, Sign::Positive) => true,
            (RoundingMode::TowardNegative, Sign::Positive)
            | (RoundingMode::TowardPositive, Sign::Negative) => false,
        }
    }
}

/// Integer quotient of two non-negative integers, rounded according to
/// `rounding_mode` as if it were the magnitude of a value with `sign`.
///
/// returns the rounded quotient and whether rounding discarded anything
pub(crate) fn round_quotient(
    numerator: &BigInt,
    denominator: &BigInt,
    sign: Sign,
    rounding_mode: RoundingMode,
) -> (BigInt, bool) {
    let (quotient, remainder) = numerator.div_rem(denominator);
    if remainder.is_zero() {
        return (quotient, false);
    }
    let half_cmp = (remainder << 1usize).cmp(denominator);
    if rounding_mode.rounds_away_from_zero(sign, half_cmp, quotient.is_odd()) {
        (quotient + BigInt::one(), true)
    } else {
        (quotient, true)
    }
}

bitflags! {
    pub struct StatusFlags: u32 {
        const INVALID_OPERATION = 0b0001;
        const OVERFLOW = 0b0010;
        const UNDERFLOW = 0b0100;
        const INEXACT = 0b1000;
    }
}

impl Default for StatusFlags {
    fn default() -> Self {
        StatusFlags::empty()
    }
}

/// Precision and rounding policy for inexact conversions, plus the status
/// flags raised so far.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Context {
    /// number of radix digits kept; `0` means unlimited (exact)
    pub precision: u64,
    pub rounding_mode: RoundingMode,
    pub status_flags: StatusFlags,
}

impl Context {
    pub fn new(precision: u64, rounding_mode: RoundingMode) -> Self {
        Self {
            precision,
            rounding_mode,
            status_flags: StatusFlags::empty(),
        }
    }
    pub fn unlimited() -> Self {
        Self::default()
    }
    pub fn is_unlimited(&self) -> bool {
        self.precision == 0
    }
}

bitflags! {
    /// Special-value and sign flags shared by all number types in this crate.
    pub struct NumberFlags: u8 {
        const NEGATIVE = 0b0001;
        const INFINITY = 0b0010;
        const QUIET_NAN = 0b0100;
        const SIGNALING_NAN = 0b1000;
        const NAN = Self::QUIET_NAN.bits | Self::SIGNALING_NAN.bits;
        const SPECIAL = Self::INFINITY.bits | Self::NAN.bits;
    }
}

impl Default for NumberFlags {
    fn default() -> Self {
        NumberFlags::empty()
    }
}

impl NumberFlags {
    pub fn sign(self) -> Sign {
        Sign::from_negative(self.contains(NumberFlags::NEGATIVE))
    }
    pub fn with_sign(self, sign: Sign) -> Self {
        let mut retval = self;
        retval.set(NumberFlags::NEGATIVE, sign.is_negative());
        retval
    }
    pub fn is_nan(self) -> bool {
        self.intersects(NumberFlags::NAN)
    }
    pub fn is_signaling_nan(self) -> bool {
        self.contains(NumberFlags::SIGNALING_NAN)
    }
    pub fn is_quiet_nan(self) -> bool {
        self.contains(NumberFlags::QUIET_NAN)
    }
    pub fn is_infinity(self) -> bool {
        self.contains(NumberFlags::INFINITY)
    }
    pub fn is_finite(self) -> bool {
        !self.intersects(NumberFlags::SPECIAL)
    }
}

/// Which operand of a binary operation supplies the NaN result.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryNaNPropagationResults {
    Neither,
    First,
    Second,
}

impl Default for BinaryNaNPropagationResults {
    fn default() -> Self {
        Self::Neither
    }
}

impl BinaryNaNPropagationResults {
    /// signaling NaNs win over quiet NaNs; ties go to the first operand
    pub fn calculate(first: NumberFlags, second: NumberFlags) -> Self {
        use BinaryNaNPropagationResults::*;
        if first.is_signaling_nan() {
            First
        } else if second.is_signaling_nan() {
            Second
        } else if first.is_nan() {
            First
        } else if second.is_nan() {
            Second
        } else {
            Neither
        }
    }
}


macro_rules! doctest {
    ($x:expr) => {
        #[doc = $x]
        extern "C" {}
    };
}

doctest!(include_str!("../README.md"));
