// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::extended::fmt_special;
use crate::BinaryNaNPropagationResults;
use crate::Context;
use crate::EDecimal;
use crate::EFloat;
use crate::Error;
use crate::Extended;
use crate::MachineFormat;
use crate::NumberFlags;
use crate::Radix;
use crate::Result;
use crate::Sign;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::Ratio;
use num_traits::One;
use num_traits::Signed;
use num_traits::ToPrimitive;
use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;
use std::ops::Div;
use std::ops::Mul;
use std::ops::Neg;
use std::ops::Rem;
use std::ops::Sub;

/// An exact rational number, or one of the special values signed infinity,
/// quiet NaN and signaling NaN.
///
/// Results are never reduced to lowest terms; use [`ERational::reduce`] when
/// a canonical form is needed. `==` is structural: `1/2` and `2/4` are
/// different values that [`ERational::compare_to`] orders as equal.
///
/// Special values always have a denominator of one. A NaN's numerator holds
/// its diagnostic payload.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ERational {
    unsigned_numerator: BigInt,
    denominator: BigInt,
    flags: NumberFlags,
}

impl Default for ERational {
    fn default() -> Self {
        Self::zero()
    }
}

macro_rules! impl_from_int_type {
    ($from_int:ident, $int:ident) => {
        pub fn $from_int(value: $int) -> Self {
            Self::from_bigint(value.into())
        }
    };
}

macro_rules! impl_to_int_type {
    ($name:ident, $exact_name:ident, $from_bigint:ident, $int:ident) => {
        /// truncates toward zero; fails if the result doesn't fit
        pub fn $name(&self) -> Result<$int> {
            self.to_bigint()?
                .$from_bigint()
                .ok_or_else(|| Error::overflow(self, stringify!($int)))
        }
        /// fails if `self` is not an integer or doesn't fit
        pub fn $exact_name(&self) -> Result<$int> {
            self.to_bigint_exact()?
                .$from_bigint()
                .ok_or_else(|| Error::overflow(self, stringify!($int)))
        }
    };
}

impl ERational {
    fn from_parts(unsigned_numerator: BigInt, denominator: BigInt, flags: NumberFlags) -> Self {
        debug_assert!(!unsigned_numerator.is_negative());
        debug_assert!(denominator.is_positive());
        Self {
            unsigned_numerator,
            denominator,
            flags,
        }
    }
    fn signed_finite(unsigned_numerator: BigInt, denominator: BigInt, sign: Sign) -> Self {
        Self::from_parts(
            unsigned_numerator,
            denominator,
            NumberFlags::empty().with_sign(sign),
        )
    }
    fn special(flags: NumberFlags, payload: BigInt) -> Self {
        Self::from_parts(payload, BigInt::one(), flags)
    }
    /// `numerator / denominator`; the sign is carried by the numerator and a
    /// zero numerator always gives positive zero
    pub fn new(numerator: BigInt, denominator: BigInt) -> Result<Self> {
        if denominator.is_zero() {
            return Err(Error::invalid_argument("denominator is zero"));
        }
        let sign = Sign::from_negative(
            !numerator.is_zero() && numerator.is_negative() != denominator.is_negative(),
        );
        Ok(Self::signed_finite(
            numerator.abs(),
            denominator.abs(),
            sign,
        ))
    }
    pub fn from_bigint(value: BigInt) -> Self {
        let sign = Sign::from_negative(value.is_negative());
        Self::signed_finite(value.abs(), BigInt::one(), sign)
    }
    impl_from_int_type!(from_u8, u8);
    impl_from_int_type!(from_u16, u16);
    impl_from_int_type!(from_u32, u32);
    impl_from_int_type!(from_u64, u64);
    impl_from_int_type!(from_u128, u128);
    impl_from_int_type!(from_i8, i8);
    impl_from_int_type!(from_i16, i16);
    impl_from_int_type!(from_i32, i32);
    impl_from_int_type!(from_i64, i64);
    impl_from_int_type!(from_i128, i128);
    pub fn from_ratio(value: &Ratio<BigInt>) -> Self {
        let sign = Sign::from_negative(value.is_negative());
        Self::signed_finite(value.numer().abs(), value.denom().abs(), sign)
    }
    pub(crate) fn from_extended<R: Radix>(value: &Extended<R>) -> Self {
        if !value.is_finite() {
            return Self::special(value.flags(), value.unsigned_mantissa().clone());
        }
        let exponent = value.fast_exponent();
        let shift = exponent
            .abs()
            .to_u64()
            .expect("exponent too large to materialize a power of the radix");
        let sign = value.flags().sign();
        if exponent.signum() >= 0 {
            Self::signed_finite(
                value.unsigned_mantissa() * R::power(shift),
                BigInt::one(),
                sign,
            )
        } else {
            Self::signed_finite(value.unsigned_mantissa().clone(), R::power(shift), sign)
        }
    }
    /// # Panics
    ///
    /// Panics if `value`'s exponent is too large to materialize
    /// `10^|exponent|`, which is the case for any exponent above `u32::MAX`.
    pub fn from_decimal(value: &EDecimal) -> Self {
        Self::from_extended(value)
    }
    /// # Panics
    ///
    /// Panics if `value`'s exponent is too large to materialize
    /// `2^|exponent|`, which is the case for any exponent above `u32::MAX`.
    pub fn from_float(value: &EFloat) -> Self {
        Self::from_extended(value)
    }
    pub fn from_f32(value: f32) -> Self {
        Self::from_float(&EFloat::from_f32(value))
    }
    pub fn from_f64(value: f64) -> Self {
        Self::from_float(&EFloat::from_f64(value))
    }
    pub fn signed_zero(sign: Sign) -> Self {
        Self::signed_finite(BigInt::zero(), BigInt::one(), sign)
    }
    pub fn zero() -> Self {
        Self::signed_zero(Sign::Positive)
    }
    pub fn negative_zero() -> Self {
        Self::signed_zero(Sign::Negative)
    }
    pub fn one() -> Self {
        Self::from_i32(1)
    }
    pub fn ten() -> Self {
        Self::from_i32(10)
    }
    pub fn signed_infinity(sign: Sign) -> Self {
        Self::special(NumberFlags::INFINITY.with_sign(sign), BigInt::zero())
    }
    pub fn positive_infinity() -> Self {
        Self::signed_infinity(Sign::Positive)
    }
    pub fn negative_infinity() -> Self {
        Self::signed_infinity(Sign::Negative)
    }
    pub fn nan() -> Self {
        Self::special(NumberFlags::QUIET_NAN, BigInt::zero())
    }
    pub fn signaling_nan() -> Self {
        Self::special(NumberFlags::SIGNALING_NAN, BigInt::zero())
    }
    /// creates a NaN carrying the diagnostic `payload`, which must not be negative
    pub fn create_nan(payload: BigInt, signaling: bool, negative: bool) -> Result<Self> {
        if payload.is_negative() {
            return Err(Error::invalid_argument("NaN payload is negative"));
        }
        let flags = if signaling {
            NumberFlags::SIGNALING_NAN
        } else {
            NumberFlags::QUIET_NAN
        };
        Ok(Self::special(
            flags.with_sign(Sign::from_negative(negative)),
            payload,
        ))
    }
    pub fn flags(&self) -> NumberFlags {
        self.flags
    }
    pub fn unsigned_numerator(&self) -> &BigInt {
        &self.unsigned_numerator
    }
    /// signed numerator; for NaNs the signed payload
    pub fn numerator(&self) -> BigInt {
        if self.is_negative() {
            -&self.unsigned_numerator
        } else {
            self.unsigned_numerator.clone()
        }
    }
    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }
    pub fn is_negative(&self) -> bool {
        self.flags.contains(NumberFlags::NEGATIVE)
    }
    pub fn is_finite(&self) -> bool {
        self.flags.is_finite()
    }
    pub fn is_infinity(&self) -> bool {
        self.flags.is_infinity()
    }
    pub fn is_positive_infinity(&self) -> bool {
        self.is_infinity() && !self.is_negative()
    }
    pub fn is_negative_infinity(&self) -> bool {
        self.is_infinity() && self.is_negative()
    }
    pub fn is_nan(&self) -> bool {
        self.flags.is_nan()
    }
    pub fn is_quiet_nan(&self) -> bool {
        self.flags.is_quiet_nan()
    }
    pub fn is_signaling_nan(&self) -> bool {
        self.flags.is_signaling_nan()
    }
    pub fn is_zero(&self) -> bool {
        self.is_finite() && self.unsigned_numerator.is_zero()
    }
    pub fn is_integer(&self) -> bool {
        self.is_finite() && self.unsigned_numerator.is_multiple_of(&self.denominator)
    }
    /// -1, 0 or 1; NaNs and infinities are never 0
    pub fn sign(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.is_negative() {
            -1
        } else {
            1
        }
    }
    fn with_sign(&self, sign: Sign) -> Self {
        let mut retval = self.clone();
        retval.flags = retval.flags.with_sign(sign);
        retval
    }
    pub fn negate(&self) -> Self {
        self.with_sign(-self.flags.sign())
    }
    pub fn abs(&self) -> Self {
        self.with_sign(Sign::Positive)
    }
    pub fn copy_sign(&self, sign_src: &Self) -> Self {
        self.with_sign(sign_src.flags.sign())
    }
    /// divides numerator and denominator by their greatest common divisor
    pub fn reduce(&self) -> Self {
        if !self.is_finite() {
            return self.clone();
        }
        let gcd = self.unsigned_numerator.gcd(&self.denominator);
        Self::from_parts(
            &self.unsigned_numerator / &gcd,
            &self.denominator / &gcd,
            self.flags,
        )
    }
    fn propagate_nan(&self, rhs: &Self) -> Option<Self> {
        match BinaryNaNPropagationResults::calculate(self.flags, rhs.flags) {
            BinaryNaNPropagationResults::First => Some(self.clone()),
            BinaryNaNPropagationResults::Second => Some(rhs.clone()),
            BinaryNaNPropagationResults::Neither => None,
        }
    }
    pub fn add(&self, rhs: &Self) -> Self {
        if let Some(retval) = self.propagate_nan(rhs) {
            return retval;
        }
        match (self.is_infinity(), rhs.is_infinity()) {
            (true, true) if self.is_negative() != rhs.is_negative() => return Self::nan(),
            (true, _) => return self.clone(),
            (false, true) => return rhs.clone(),
            (false, false) => {}
        }
        match (self.is_zero(), rhs.is_zero()) {
            (true, true) => {
                return Self::signed_zero(Sign::from_negative(
                    self.is_negative() && rhs.is_negative(),
                ))
            }
            (false, true) => return self.clone(),
            (true, false) => return rhs.clone(),
            (false, false) => {}
        }
        let numerator = self.numerator() * &rhs.denominator + rhs.numerator() * &self.denominator;
        let denominator = &self.denominator * &rhs.denominator;
        // exact cancellation gives positive zero
        let sign = Sign::from_negative(numerator.is_negative());
        Self::signed_finite(numerator.abs(), denominator, sign)
    }
    pub fn subtract(&self, rhs: &Self) -> Self {
        if let Some(retval) = self.propagate_nan(rhs) {
            return retval;
        }
        self.add(&rhs.negate())
    }
    pub fn multiply(&self, rhs: &Self) -> Self {
        if let Some(retval) = self.propagate_nan(rhs) {
            return retval;
        }
        let sign = self.flags.sign() * rhs.flags.sign();
        if (self.is_infinity() && rhs.is_zero()) || (self.is_zero() && rhs.is_infinity()) {
            Self::nan()
        } else if self.is_infinity() || rhs.is_infinity() {
            Self::signed_infinity(sign)
        } else {
            Self::signed_finite(
                &self.unsigned_numerator * &rhs.unsigned_numerator,
                &self.denominator * &rhs.denominator,
                sign,
            )
        }
    }
    pub fn divide(&self, rhs: &Self) -> Self {
        if let Some(retval) = self.propagate_nan(rhs) {
            return retval;
        }
        let sign = self.flags.sign() * rhs.flags.sign();
        if self.is_infinity() && rhs.is_infinity() {
            Self::nan()
        } else if self.is_infinity() {
            Self::signed_infinity(sign)
        } else if rhs.is_infinity() {
            Self::signed_zero(sign)
        } else if rhs.is_zero() {
            if self.is_zero() {
                Self::nan()
            } else {
                Self::signed_infinity(sign)
            }
        } else if self.is_zero() {
            Self::signed_zero(sign)
        } else {
            Self::signed_finite(
                &self.unsigned_numerator * &rhs.denominator,
                &self.denominator * &rhs.unsigned_numerator,
                sign,
            )
        }
    }
    /// truncating remainder; the result has the sign of `self`
    pub fn remainder(&self, rhs: &Self) -> Self {
        if let Some(retval) = self.propagate_nan(rhs) {
            return retval;
        }
        if self.is_infinity() || rhs.is_zero() {
            Self::nan()
        } else if rhs.is_infinity() || self.is_zero() {
            self.clone()
        } else {
            let dividend = &self.unsigned_numerator * &rhs.denominator;
            let divisor = &rhs.unsigned_numerator * &self.denominator;
            Self::signed_finite(
                dividend % divisor,
                &self.denominator * &rhs.denominator,
                self.flags.sign(),
            )
        }
    }
    fn compare_finite_magnitude(&self, rhs: &Self) -> Ordering {
        if self.unsigned_numerator == rhs.unsigned_numerator {
            rhs.denominator.cmp(&self.denominator)
        } else if self.denominator == rhs.denominator {
            self.unsigned_numerator.cmp(&rhs.unsigned_numerator)
        } else {
            (&self.unsigned_numerator * &rhs.denominator)
                .cmp(&(&rhs.unsigned_numerator * &self.denominator))
        }
    }
    /// Total order by value: NaNs are equal to each other and greater than
    /// everything else, and zeros compare equal regardless of sign.
    pub fn compare_to(&self, rhs: &Self) -> Ordering {
        if self.is_nan() || rhs.is_nan() {
            return self.is_nan().cmp(&rhs.is_nan());
        }
        let sign_cmp = self.sign().cmp(&rhs.sign());
        if sign_cmp != Ordering::Equal || self.is_zero() {
            return sign_cmp;
        }
        let magnitude_cmp = match (self.is_infinity(), rhs.is_infinity()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare_finite_magnitude(rhs),
        };
        self.flags.sign().apply(magnitude_cmp)
    }
    pub fn to_ratio(&self) -> Option<Ratio<BigInt>> {
        if !self.is_finite() {
            return None;
        }
        Some(Ratio::new(self.numerator(), self.denominator.clone()))
    }
    /// truncates toward zero
    pub fn to_bigint(&self) -> Result<BigInt> {
        if !self.is_finite() {
            return Err(Error::overflow(self, "integer"));
        }
        let magnitude = &self.unsigned_numerator / &self.denominator;
        Ok(if self.is_negative() {
            -magnitude
        } else {
            magnitude
        })
    }
    pub fn to_bigint_exact(&self) -> Result<BigInt> {
        if !self.is_finite() {
            return Err(Error::overflow(self, "integer"));
        }
        let (magnitude, remainder) = self.unsigned_numerator.div_rem(&self.denominator);
        if !remainder.is_zero() {
            return Err(Error::non_integral(self));
        }
        Ok(if self.is_negative() {
            -magnitude
        } else {
            magnitude
        })
    }
    impl_to_int_type!(to_u8, to_u8_exact, to_u8, u8);
    impl_to_int_type!(to_u16, to_u16_exact, to_u16, u16);
    impl_to_int_type!(to_u32, to_u32_exact, to_u32, u32);
    impl_to_int_type!(to_u64, to_u64_exact, to_u64, u64);
    impl_to_int_type!(to_u128, to_u128_exact, to_u128, u128);
    impl_to_int_type!(to_i8, to_i8_exact, to_i8, i8);
    impl_to_int_type!(to_i16, to_i16_exact, to_i16, i16);
    impl_to_int_type!(to_i32, to_i32_exact, to_i32, i32);
    impl_to_int_type!(to_i64, to_i64_exact, to_i64, i64);
    impl_to_int_type!(to_i128, to_i128_exact, to_i128, i128);
    pub(crate) fn to_extended<R: Radix>(&self, ctx: Option<&mut Context>) -> Extended<R> {
        if !self.is_finite() {
            return Extended::special(self.flags, self.unsigned_numerator.clone());
        }
        if self.is_zero() {
            return Extended::signed_zero(self.flags.sign());
        }
        Extended::divide(&self.numerator(), &self.denominator, ctx)
    }
    /// Exact when `ctx` is `None` or unlimited: a quotient that doesn't
    /// terminate in radix 10 then gives NaN.
    pub fn to_decimal(&self, ctx: Option<&mut Context>) -> EDecimal {
        self.to_extended(ctx)
    }
    /// Exact when `ctx` is `None` or unlimited: a quotient that doesn't
    /// terminate in radix 2 then gives NaN.
    pub fn to_float(&self, ctx: Option<&mut Context>) -> EFloat {
        self.to_extended(ctx)
    }
    fn to_machine_bits(&self, format: MachineFormat, ctx: Option<&mut Context>) -> u64 {
        if self.is_finite() {
            format.encode_ratio(
                self.flags.sign(),
                &self.unsigned_numerator,
                &self.denominator,
                ctx,
            )
        } else {
            format.encode_special(self.flags, &self.unsigned_numerator)
        }
    }
    /// correctly rounded using `ctx`'s rounding mode; raises `ctx`'s status flags
    pub fn to_f64_with_context(&self, ctx: Option<&mut Context>) -> f64 {
        f64::from_bits(self.to_machine_bits(MachineFormat::BINARY64, ctx))
    }
    pub fn to_f64(&self) -> f64 {
        self.to_f64_with_context(None)
    }
    /// correctly rounded using `ctx`'s rounding mode; raises `ctx`'s status flags
    pub fn to_f32_with_context(&self, ctx: Option<&mut Context>) -> f32 {
        let bits = self.to_machine_bits(MachineFormat::BINARY32, ctx);
        f32::from_bits(bits.to_u32().expect("binary32 bits fit in u32"))
    }
    pub fn to_f32(&self) -> f32 {
        self.to_f32_with_context(None)
    }
}

impl From<BigInt> for ERational {
    fn from(value: BigInt) -> Self {
        Self::from_bigint(value)
    }
}

impl From<&Ratio<BigInt>> for ERational {
    fn from(value: &Ratio<BigInt>) -> Self {
        Self::from_ratio(value)
    }
}

impl fmt::Display for ERational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_finite() {
            return fmt_special(self.flags, &self.unsigned_numerator, f);
        }
        write!(f, "{}/{}", self.numerator(), self.denominator)
    }
}

macro_rules! impl_rational_binary_op {
    ($op:ident, $op_fn:ident, $method:ident) => {
        impl $op<&ERational> for &ERational {
            type Output = ERational;
            fn $op_fn(self, rhs: &ERational) -> ERational {
                ERational::$method(self, rhs)
            }
        }
    };
}

impl_rational_binary_op!(Add, add, add);
impl_rational_binary_op!(Sub, sub, subtract);
impl_rational_binary_op!(Mul, mul, multiply);
impl_rational_binary_op!(Div, div, divide);
impl_rational_binary_op!(Rem, rem, remainder);

impl Neg for &ERational {
    type Output = ERational;
    fn neg(self) -> ERational {
        self.negate()
    }
}
