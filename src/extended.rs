// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

//! Arbitrary-precision floating values in radix 10 ([`EDecimal`]) and radix 2
//! ([`EFloat`]).
//!
//! Only the operations the rational engine needs are provided: special
//! values, exact ordering, and division of two integers under a [`Context`].

use crate::round_quotient;
use crate::Context;
use crate::Error;
use crate::FastInteger;
use crate::NumberFlags;
use crate::Result;
use crate::Sign;
use crate::StatusFlags;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use num_traits::Signed;
use num_traits::Zero;
use once_cell::sync::Lazy;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

const POWER_CACHE_SIZE: u32 = 64;

static POWERS_OF_TEN: Lazy<Vec<BigInt>> = Lazy::new(|| {
    let ten = BigInt::from(10u32);
    (0..POWER_CACHE_SIZE).map(|exponent| ten.pow(exponent)).collect()
});

static POWERS_OF_FIVE: Lazy<Vec<BigInt>> = Lazy::new(|| {
    let five = BigInt::from(5u32);
    (0..POWER_CACHE_SIZE).map(|exponent| five.pow(exponent)).collect()
});

fn cached_power(cache: &[BigInt], base: u32, exponent: u64) -> BigInt {
    if let Some(retval) = usize::try_from(exponent)
        .ok()
        .and_then(|index| cache.get(index))
    {
        return retval.clone();
    }
    let exponent =
        u32::try_from(exponent).expect("exponent too large to materialize a power of the radix");
    BigInt::from(base).pow(exponent)
}

fn power_of_five(exponent: u64) -> BigInt {
    cached_power(&POWERS_OF_FIVE, 5, exponent)
}

/// removes every factor of `factor` from `value`, returning how many there were
fn strip_factor(value: &mut BigInt, factor: u32) -> u64 {
    let factor = BigInt::from(factor);
    let mut count = 0;
    loop {
        let (quotient, remainder) = value.div_rem(&factor);
        if !remainder.is_zero() {
            return count;
        }
        *value = quotient;
        count += 1;
    }
}

pub trait Radix: Copy + Clone + Eq + PartialEq + Hash + fmt::Debug + Default + 'static {
    const RADIX: u32;
    /// separates mantissa and exponent in `Display` output
    const EXPONENT_MARKER: char;
    /// exponent magnitude above which comparisons against a rational try
    /// cheap bounds before materializing `RADIX^exponent`
    const COMPARE_SHORTCUT_THRESHOLD: i32;
    /// digits kept by the low-precision lower bound used while comparing
    const COMPARE_WORKING_PRECISION: u64;
    fn power(exponent: u64) -> BigInt;
    /// number of radix digits in `|value|`; zero has one digit
    fn digit_count(value: &BigInt) -> u64;
    /// `Some((multiplier, exponent))` with `denominator * multiplier == RADIX^exponent`
    /// if `denominator` divides some power of the radix
    fn terminating_scale(denominator: &BigInt) -> Option<(BigInt, u64)>;
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Decimal;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Binary;

impl Radix for Decimal {
    const RADIX: u32 = 10;
    const EXPONENT_MARKER: char = 'E';
    const COMPARE_SHORTCUT_THRESHOLD: i32 = 50;
    const COMPARE_WORKING_PRECISION: u64 = 20;
    fn power(exponent: u64) -> BigInt {
        cached_power(&POWERS_OF_TEN, 10, exponent)
    }
    fn digit_count(value: &BigInt) -> u64 {
        let magnitude = value.abs();
        if magnitude.is_zero() {
            return 1;
        }
        // 0.301029 < log10(2), so this never overestimates
        let mut retval = (magnitude.bits() - 1) * 301_029 / 1_000_000 + 1;
        let mut bound = Self::power(retval);
        while magnitude >= bound {
            bound *= 10u32;
            retval += 1;
        }
        retval
    }
    fn terminating_scale(denominator: &BigInt) -> Option<(BigInt, u64)> {
        let mut rest = denominator.abs();
        let twos = strip_factor(&mut rest, 2);
        let fives = strip_factor(&mut rest, 5);
        if !rest.is_one() {
            return None;
        }
        let exponent = twos.max(fives);
        let twos_needed = exponent - twos;
        let fives_needed = exponent - fives;
        let shift = usize::try_from(twos_needed).expect("shift doesn't fit in usize");
        Some((power_of_five(fives_needed) << shift, exponent))
    }
}

impl Radix for Binary {
    const RADIX: u32 = 2;
    const EXPONENT_MARKER: char = 'P';
    const COMPARE_SHORTCUT_THRESHOLD: i32 = 1000;
    const COMPARE_WORKING_PRECISION: u64 = 256;
    fn power(exponent: u64) -> BigInt {
        BigInt::one() << usize::try_from(exponent).expect("exponent doesn't fit in usize")
    }
    fn digit_count(value: &BigInt) -> u64 {
        value.bits().max(1)
    }
    fn terminating_scale(denominator: &BigInt) -> Option<(BigInt, u64)> {
        let magnitude = denominator.abs();
        let exponent = magnitude.trailing_zeros()?;
        if (magnitude >> usize::try_from(exponent).ok()?).is_one() {
            Some((BigInt::one(), exponent))
        } else {
            None
        }
    }
}

/// `(-1)^negative * unsigned_mantissa * RADIX^exponent`, or a special value.
///
/// For NaNs `unsigned_mantissa` holds the diagnostic payload.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Extended<R: Radix> {
    unsigned_mantissa: BigInt,
    exponent: FastInteger,
    flags: NumberFlags,
    radix: PhantomData<R>,
}

pub type EDecimal = Extended<Decimal>;
pub type EFloat = Extended<Binary>;

impl<R: Radix> Default for Extended<R> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<R: Radix> Extended<R> {
    pub(crate) fn from_parts(
        unsigned_mantissa: BigInt,
        exponent: FastInteger,
        flags: NumberFlags,
    ) -> Self {
        debug_assert!(!unsigned_mantissa.is_negative());
        Self {
            unsigned_mantissa,
            exponent,
            flags,
            radix: PhantomData,
        }
    }
    fn signed_finite(unsigned_mantissa: BigInt, exponent: FastInteger, sign: Sign) -> Self {
        Self::from_parts(
            unsigned_mantissa,
            exponent,
            NumberFlags::empty().with_sign(sign),
        )
    }
    pub(crate) fn special(flags: NumberFlags, payload: BigInt) -> Self {
        Self::from_parts(payload, FastInteger::zero(), flags)
    }
    /// the value `mantissa * RADIX^exponent`
    pub fn new(mantissa: BigInt, exponent: BigInt) -> Self {
        let sign = Sign::from_negative(mantissa.is_negative());
        Self::signed_finite(mantissa.abs(), exponent.into(), sign)
    }
    pub fn from_bigint(value: BigInt) -> Self {
        Self::new(value, BigInt::zero())
    }
    pub fn from_i64(value: i64) -> Self {
        Self::from_bigint(value.into())
    }
    pub fn signed_zero(sign: Sign) -> Self {
        Self::signed_finite(BigInt::zero(), FastInteger::zero(), sign)
    }
    pub fn zero() -> Self {
        Self::signed_zero(Sign::Positive)
    }
    pub fn negative_zero() -> Self {
        Self::signed_zero(Sign::Negative)
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
    pub fn unsigned_mantissa(&self) -> &BigInt {
        &self.unsigned_mantissa
    }
    /// signed mantissa; for NaNs the signed payload
    pub fn mantissa(&self) -> BigInt {
        if self.is_negative() {
            -&self.unsigned_mantissa
        } else {
            self.unsigned_mantissa.clone()
        }
    }
    pub fn exponent(&self) -> BigInt {
        self.exponent.to_bigint()
    }
    pub(crate) fn fast_exponent(&self) -> &FastInteger {
        &self.exponent
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
        self.is_finite() && self.unsigned_mantissa.is_zero()
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
    pub fn abs(&self) -> Self {
        self.with_sign(Sign::Positive)
    }
    pub fn negate(&self) -> Self {
        self.with_sign(-self.flags.sign())
    }
    pub fn copy_sign(&self, sign_src: &Self) -> Self {
        self.with_sign(sign_src.flags.sign())
    }
    fn with_sign(&self, sign: Sign) -> Self {
        let mut retval = self.clone();
        retval.flags = retval.flags.with_sign(sign);
        retval
    }
    /// exponent of the most significant digit: `exponent + digit_count - 1`
    pub fn adjusted_exponent(&self) -> BigInt {
        self.fast_adjusted_exponent().into_bigint()
    }
    fn fast_adjusted_exponent(&self) -> FastInteger {
        self.exponent
            .add(&FastInteger::from_u64(R::digit_count(&self.unsigned_mantissa)))
            .sub_i32(1)
    }
    fn compare_finite_magnitude(&self, rhs: &Self) -> Ordering {
        match (self.unsigned_mantissa.is_zero(), rhs.unsigned_mantissa.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        let adjusted_cmp = self
            .fast_adjusted_exponent()
            .cmp(&rhs.fast_adjusted_exponent());
        if adjusted_cmp != Ordering::Equal {
            return adjusted_cmp;
        }
        // equal adjusted exponents bound the exponent difference by the digit counts
        let difference = self.exponent.sub(&rhs.exponent);
        let shift = difference
            .abs()
            .to_u64()
            .expect("exponent difference is bounded by digit counts");
        match difference.signum() {
            0 => self.unsigned_mantissa.cmp(&rhs.unsigned_mantissa),
            1 => (&self.unsigned_mantissa * R::power(shift)).cmp(&rhs.unsigned_mantissa),
            _ => self
                .unsigned_mantissa
                .cmp(&(&rhs.unsigned_mantissa * R::power(shift))),
        }
    }
    /// Total order: NaNs are equal to each other and greater than everything
    /// else, and zeros compare equal regardless of sign.
    pub fn compare_to(&self, rhs: &Self) -> Ordering {
        if self.is_nan() || rhs.is_nan() {
            return self.is_nan().cmp(&rhs.is_nan());
        }
        let sign_cmp = self.sign().cmp(&rhs.sign());
        if sign_cmp != Ordering::Equal || self.is_zero() {
            return sign_cmp;
        }
        let sign = self.flags.sign();
        let magnitude_cmp = match (self.is_infinity(), rhs.is_infinity()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare_finite_magnitude(rhs),
        };
        sign.apply(magnitude_cmp)
    }
    fn scaled_operands(
        numerator: &BigInt,
        denominator: &BigInt,
        exponent: &FastInteger,
    ) -> (BigInt, BigInt) {
        let shift = exponent
            .abs()
            .to_u64()
            .expect("scaling exponent doesn't fit in u64");
        if exponent.signum() >= 0 {
            (numerator.clone(), denominator * R::power(shift))
        } else {
            (numerator * R::power(shift), denominator.clone())
        }
    }
    /// Rounds `numerator / denominator` to `ctx.precision` radix digits.
    ///
    /// With unlimited precision the quotient must terminate in this radix,
    /// otherwise the result is NaN and `INVALID_OPERATION` is raised.
    pub fn divide(numerator: &BigInt, denominator: &BigInt, ctx: Option<&mut Context>) -> Self {
        let mut default_ctx = Context::default();
        let ctx = ctx.unwrap_or(&mut default_ctx);
        let sign = Sign::from_negative(numerator.is_negative() != denominator.is_negative());
        if denominator.is_zero() {
            if numerator.is_zero() {
                ctx.status_flags |= StatusFlags::INVALID_OPERATION;
                return Self::nan();
            }
            return Self::signed_infinity(sign);
        }
        if numerator.is_zero() {
            return Self::signed_zero(sign);
        }
        let numerator = numerator.abs();
        let denominator = denominator.abs();
        if ctx.is_unlimited() {
            let gcd = numerator.gcd(&denominator);
            let numerator = numerator / &gcd;
            let denominator = denominator / &gcd;
            return match R::terminating_scale(&denominator) {
                Some((multiplier, exponent)) => Self::signed_finite(
                    numerator * multiplier,
                    FastInteger::from_u64(exponent).neg(),
                    sign,
                ),
                None => {
                    ctx.status_flags |= StatusFlags::INVALID_OPERATION;
                    Self::nan()
                }
            };
        }
        let precision = FastInteger::from_u64(ctx.precision);
        let max_mantissa = R::power(ctx.precision);
        // quotient / RADIX^exponent lands in (RADIX^(precision-1), RADIX^(precision+1))
        let mut exponent = FastInteger::from_u64(R::digit_count(&numerator))
            .sub(&FastInteger::from_u64(R::digit_count(&denominator)))
            .sub(&precision);
        let (mut scaled_numerator, mut scaled_denominator) =
            Self::scaled_operands(&numerator, &denominator, &exponent);
        if scaled_numerator >= &scaled_denominator * &max_mantissa {
            exponent = exponent.add_i32(1);
            let scaled = Self::scaled_operands(&numerator, &denominator, &exponent);
            scaled_numerator = scaled.0;
            scaled_denominator = scaled.1;
        }
        let (mut mantissa, inexact) = round_quotient(
            &scaled_numerator,
            &scaled_denominator,
            sign,
            ctx.rounding_mode,
        );
        if mantissa == max_mantissa {
            mantissa = R::power(ctx.precision - 1);
            exponent = exponent.add_i32(1);
        }
        if inexact {
            ctx.status_flags |= StatusFlags::INEXACT;
        }
        Self::signed_finite(mantissa, exponent, sign)
    }
}

/// writes the shared spelling of infinities and NaNs
pub(crate) fn fmt_special(
    flags: NumberFlags,
    payload: &BigInt,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    if flags.contains(NumberFlags::NEGATIVE) {
        f.write_str("-")?;
    }
    if flags.is_infinity() {
        return f.write_str("Infinity");
    }
    if flags.is_signaling_nan() {
        f.write_str("sNaN")?;
    } else {
        f.write_str("NaN")?;
    }
    if !payload.is_zero() {
        write!(f, "{}", payload)?;
    }
    Ok(())
}

impl<R: Radix> fmt::Display for Extended<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.is_finite() {
            return fmt_special(self.flags, &self.unsigned_mantissa, f);
        }
        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(
            f,
            "{}{}{}",
            self.unsigned_mantissa,
            R::EXPONENT_MARKER,
            self.exponent
        )
    }
}

impl<R: Radix> fmt::Debug for Extended<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Extended")
            .field("radix", &R::RADIX)
            .field("flags", &self.flags)
            .field("unsigned_mantissa", &format_args!("{}", self.unsigned_mantissa))
            .field("exponent", &format_args!("{}", self.exponent))
            .finish()
    }
}
