// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

//! Integer that stays in a machine word until an operation overflows it.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;
use num_traits::ToPrimitive;
use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::ops::Add;
use std::ops::Neg;
use std::ops::Sub;

#[derive(Clone)]
enum Repr {
    Small(i32),
    Large(BigInt),
}

/// An integer that is a machine word while small and an arbitrary-precision
/// integer otherwise.
///
/// Every result is identical to performing the operation on [`BigInt`]s; the
/// active representation is never observable.
#[derive(Clone)]
pub struct FastInteger(Repr);

impl FastInteger {
    pub fn from_i32(value: i32) -> Self {
        FastInteger(Repr::Small(value))
    }
    pub fn from_i64(value: i64) -> Self {
        match value.to_i32() {
            Some(value) => Self::from_i32(value),
            None => FastInteger(Repr::Large(value.into())),
        }
    }
    pub fn from_u64(value: u64) -> Self {
        match value.to_i32() {
            Some(value) => Self::from_i32(value),
            None => FastInteger(Repr::Large(value.into())),
        }
    }
    /// selects the machine word representation whenever `value` fits
    pub fn from_bigint(value: BigInt) -> Self {
        match value.to_i32() {
            Some(value) => Self::from_i32(value),
            None => FastInteger(Repr::Large(value)),
        }
    }
    pub fn zero() -> Self {
        Self::from_i32(0)
    }
    fn promoted(&self) -> BigInt {
        match &self.0 {
            Repr::Small(value) => BigInt::from(*value),
            Repr::Large(value) => value.clone(),
        }
    }
    pub fn to_bigint(&self) -> BigInt {
        self.promoted()
    }
    pub fn into_bigint(self) -> BigInt {
        match self.0 {
            Repr::Small(value) => BigInt::from(value),
            Repr::Large(value) => value,
        }
    }
    pub fn to_i64(&self) -> Option<i64> {
        match &self.0 {
            Repr::Small(value) => Some(i64::from(*value)),
            Repr::Large(value) => value.to_i64(),
        }
    }
    pub fn to_u64(&self) -> Option<u64> {
        match &self.0 {
            Repr::Small(value) => value.to_u64(),
            Repr::Large(value) => value.to_u64(),
        }
    }
    pub fn add(&self, rhs: &Self) -> Self {
        if let (Repr::Small(lhs), Repr::Small(rhs)) = (&self.0, &rhs.0) {
            if let Some(sum) = lhs.checked_add(*rhs) {
                return Self::from_i32(sum);
            }
            tracing::trace!(lhs, rhs, "fast integer add promoted");
        }
        Self::from_bigint(self.promoted() + rhs.promoted())
    }
    pub fn sub(&self, rhs: &Self) -> Self {
        if let (Repr::Small(lhs), Repr::Small(rhs)) = (&self.0, &rhs.0) {
            if let Some(difference) = lhs.checked_sub(*rhs) {
                return Self::from_i32(difference);
            }
            tracing::trace!(lhs, rhs, "fast integer sub promoted");
        }
        Self::from_bigint(self.promoted() - rhs.promoted())
    }
    pub fn add_i32(&self, rhs: i32) -> Self {
        self.add(&Self::from_i32(rhs))
    }
    pub fn sub_i32(&self, rhs: i32) -> Self {
        self.sub(&Self::from_i32(rhs))
    }
    pub fn neg(&self) -> Self {
        match &self.0 {
            // i32::MIN has no machine word negation
            Repr::Small(value) => match value.checked_neg() {
                Some(value) => Self::from_i32(value),
                None => FastInteger(Repr::Large(-BigInt::from(*value))),
            },
            Repr::Large(value) => Self::from_bigint(-value),
        }
    }
    pub fn abs(&self) -> Self {
        if self.signum() < 0 {
            self.neg()
        } else {
            self.clone()
        }
    }
    pub fn is_zero(&self) -> bool {
        match &self.0 {
            Repr::Small(value) => *value == 0,
            Repr::Large(value) => value.is_zero(),
        }
    }
    pub fn is_even(&self) -> bool {
        match &self.0 {
            Repr::Small(value) => value.is_even(),
            Repr::Large(value) => value.is_even(),
        }
    }
    pub fn signum(&self) -> i32 {
        match &self.0 {
            Repr::Small(value) => value.signum(),
            Repr::Large(value) => {
                if value.is_positive() {
                    1
                } else if value.is_negative() {
                    -1
                } else {
                    0
                }
            }
        }
    }
    pub fn compare_to_i32(&self, rhs: i32) -> Ordering {
        match &self.0 {
            Repr::Small(value) => value.cmp(&rhs),
            Repr::Large(value) => value.cmp(&BigInt::from(rhs)),
        }
    }
}

impl Default for FastInteger {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i32> for FastInteger {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}

impl From<i64> for FastInteger {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<BigInt> for FastInteger {
    fn from(value: BigInt) -> Self {
        Self::from_bigint(value)
    }
}

impl From<FastInteger> for BigInt {
    fn from(value: FastInteger) -> Self {
        value.into_bigint()
    }
}

impl Ord for FastInteger {
    fn cmp(&self, rhs: &Self) -> Ordering {
        match (&self.0, &rhs.0) {
            (Repr::Small(lhs), Repr::Small(rhs)) => lhs.cmp(rhs),
            (Repr::Large(lhs), Repr::Large(rhs)) => lhs.cmp(rhs),
            _ => self.promoted().cmp(&rhs.promoted()),
        }
    }
}

impl PartialOrd for FastInteger {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}

impl PartialEq for FastInteger {
    fn eq(&self, rhs: &Self) -> bool {
        self.cmp(rhs) == Ordering::Equal
    }
}

impl Eq for FastInteger {}

impl Hash for FastInteger {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.promoted().hash(state)
    }
}

impl fmt::Display for FastInteger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.0 {
            Repr::Small(value) => fmt::Display::fmt(value, f),
            Repr::Large(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl fmt::Debug for FastInteger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "FastInteger({})", self)
    }
}

macro_rules! impl_fast_integer_binary_op {
    ($op:ident, $op_fn:ident) => {
        impl $op<&FastInteger> for &FastInteger {
            type Output = FastInteger;
            fn $op_fn(self, rhs: &FastInteger) -> FastInteger {
                FastInteger::$op_fn(self, rhs)
            }
        }
    };
}

impl_fast_integer_binary_op!(Add, add);
impl_fast_integer_binary_op!(Sub, sub);

impl Neg for &FastInteger {
    type Output = FastInteger;
    fn neg(self) -> FastInteger {
        FastInteger::neg(self)
    }
}
