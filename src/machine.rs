// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::fast_integer::FastInteger;
use crate::round_quotient;
use crate::Context;
use crate::EFloat;
use crate::NumberFlags;
use crate::RoundingMode;
use crate::Sign;
use crate::StatusFlags;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use num_traits::Zero;
use std::cmp::Ordering;

/// Layout of an IEEE 754 binary interchange format: a sign bit, a biased
/// exponent field and a fraction field with an implicit leading bit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MachineFormat {
    exponent_width: usize,
    fraction_width: usize,
}

impl MachineFormat {
    pub const BINARY32: Self = Self::new(8, 23);
    pub const BINARY64: Self = Self::new(11, 52);
    const fn new(exponent_width: usize, fraction_width: usize) -> Self {
        Self {
            exponent_width,
            fraction_width,
        }
    }
    pub const fn exponent_width(self) -> usize {
        self.exponent_width
    }
    pub const fn fraction_width(self) -> usize {
        self.fraction_width
    }
    pub const fn width(self) -> usize {
        1 + self.exponent_width + self.fraction_width
    }
    const fn exponent_bias(self) -> i64 {
        (1 << (self.exponent_width - 1)) - 1
    }
    const fn exponent_inf_nan(self) -> u64 {
        (1 << self.exponent_width) - 1
    }
    const fn exponent_max_normal(self) -> i64 {
        self.exponent_bias()
    }
    const fn exponent_min_normal(self) -> i64 {
        1 - self.exponent_bias()
    }
    const fn sign_field_mask(self) -> u64 {
        1 << (self.exponent_width + self.fraction_width)
    }
    const fn fraction_field_mask(self) -> u64 {
        (1 << self.fraction_width) - 1
    }
    const fn quiet_nan_mask(self) -> u64 {
        1 << (self.fraction_width - 1)
    }
    fn sign_bits(self, sign: Sign) -> u64 {
        match sign {
            Sign::Positive => 0,
            Sign::Negative => self.sign_field_mask(),
        }
    }
    fn infinity_bits(self, sign: Sign) -> u64 {
        self.sign_bits(sign) | self.exponent_inf_nan() << self.fraction_width
    }
    fn max_normal_bits(self, sign: Sign) -> u64 {
        self.sign_bits(sign)
            | (self.exponent_inf_nan() - 1) << self.fraction_width
            | self.fraction_field_mask()
    }
    /// Decodes the low `self.width()` bits of `bits`.
    ///
    /// Finite results have trailing zero bits stripped from the mantissa, so
    /// `0.5` decodes as `1P-1` rather than with a 53-bit mantissa.
    pub fn decode(self, bits: u64) -> EFloat {
        let sign = Sign::from_negative(bits & self.sign_field_mask() != 0);
        let exponent_field = (bits >> self.fraction_width) & self.exponent_inf_nan();
        let fraction = bits & self.fraction_field_mask();
        if exponent_field == self.exponent_inf_nan() {
            if fraction == 0 {
                return EFloat::signed_infinity(sign);
            }
            let flags = if fraction & self.quiet_nan_mask() != 0 {
                NumberFlags::QUIET_NAN
            } else {
                NumberFlags::SIGNALING_NAN
            };
            let payload = fraction & (self.quiet_nan_mask() - 1);
            return EFloat::special(flags.with_sign(sign), payload.into());
        }
        let (mut mantissa, mut exponent) = if exponent_field == 0 {
            if fraction == 0 {
                return EFloat::signed_zero(sign);
            }
            (fraction, self.exponent_min_normal())
        } else {
            (
                fraction | 1 << self.fraction_width,
                exponent_field as i64 - self.exponent_bias(),
            )
        };
        exponent -= self.fraction_width as i64;
        let trailing_zeros = mantissa.trailing_zeros();
        mantissa >>= trailing_zeros;
        exponent += i64::from(trailing_zeros);
        EFloat::from_parts(
            mantissa.into(),
            FastInteger::from_i64(exponent),
            NumberFlags::empty().with_sign(sign),
        )
    }
    /// Encodes an infinity or NaN; the NaN payload keeps only the bits that
    /// fit beside the quiet bit.
    pub fn encode_special(self, flags: NumberFlags, payload: &BigInt) -> u64 {
        let sign = flags.sign();
        if !flags.is_nan() {
            return self.infinity_bits(sign);
        }
        let payload_mask = self.quiet_nan_mask() - 1;
        let mut fraction = (payload & &BigInt::from(payload_mask))
            .to_u64()
            .expect("masked payload fits in u64");
        if flags.is_quiet_nan() {
            fraction |= self.quiet_nan_mask();
        } else if fraction == 0 {
            fraction = 1;
        }
        self.infinity_bits(sign) | fraction
    }
    pub fn encode(self, value: &EFloat, ctx: Option<&mut Context>) -> u64 {
        if !value.is_finite() {
            return self.encode_special(value.flags(), value.unsigned_mantissa());
        }
        let sign = value.flags().sign();
        if value.is_zero() {
            return self.sign_bits(sign);
        }
        let mut default_ctx = Context::default();
        let ctx = ctx.unwrap_or(&mut default_ctx);
        let exponent = value.fast_exponent();
        let lead_exponent =
            exponent.add(&FastInteger::from_u64(value.unsigned_mantissa().bits() - 1));
        if let Some(bits) = self.encode_out_of_range(sign, &lead_exponent, ctx) {
            return bits;
        }
        let exponent = exponent
            .to_i64()
            .expect("in-range exponent fits in i64");
        if exponent >= 0 {
            self.encode_ratio_with_context(
                sign,
                &(value.unsigned_mantissa() << exponent as usize),
                &BigInt::from(1),
                ctx,
            )
        } else {
            self.encode_ratio_with_context(
                sign,
                value.unsigned_mantissa(),
                &(BigInt::from(1) << (-exponent) as usize),
                ctx,
            )
        }
    }
    /// Correctly rounds `(-1)^sign * numerator / denominator` to this format.
    ///
    /// Both `numerator` and `denominator` must be non-negative, and
    /// `denominator` must be non-zero.
    pub fn encode_ratio(
        self,
        sign: Sign,
        numerator: &BigInt,
        denominator: &BigInt,
        ctx: Option<&mut Context>,
    ) -> u64 {
        let mut default_ctx = Context::default();
        let ctx = ctx.unwrap_or(&mut default_ctx);
        self.encode_ratio_with_context(sign, numerator, denominator, ctx)
    }
    fn overflow_bits(self, sign: Sign, ctx: &mut Context) -> u64 {
        ctx.status_flags |= StatusFlags::INEXACT | StatusFlags::OVERFLOW;
        match (ctx.rounding_mode, sign) {
            (RoundingMode::TowardNegative, Sign::Positive)
            | (RoundingMode::TowardPositive, Sign::Negative)
            | (RoundingMode::TowardZero, _) => self.max_normal_bits(sign),
            (RoundingMode::TowardNegative, Sign::Negative)
            | (RoundingMode::TowardPositive, Sign::Positive)
            | (RoundingMode::TiesToEven, _)
            | (RoundingMode::TiesToAway, _) => self.infinity_bits(sign),
        }
    }
    /// values below half the smallest subnormal round to zero or to the
    /// smallest subnormal depending only on the rounding mode
    fn tiny_bits(self, sign: Sign, ctx: &mut Context) -> u64 {
        ctx.status_flags |= StatusFlags::INEXACT | StatusFlags::UNDERFLOW;
        if ctx
            .rounding_mode
            .rounds_away_from_zero(sign, Ordering::Less, false)
        {
            self.sign_bits(sign) | 1
        } else {
            self.sign_bits(sign)
        }
    }
    fn encode_out_of_range(
        self,
        sign: Sign,
        lead_exponent: &FastInteger,
        ctx: &mut Context,
    ) -> Option<u64> {
        let max = FastInteger::from_i64(self.exponent_max_normal());
        let tiny = FastInteger::from_i64(
            self.exponent_min_normal() - self.fraction_width as i64 - 2,
        );
        if *lead_exponent > max {
            tracing::trace!(format = ?self, "machine float overflow");
            Some(self.overflow_bits(sign, ctx))
        } else if *lead_exponent < tiny {
            Some(self.tiny_bits(sign, ctx))
        } else {
            None
        }
    }
    fn encode_ratio_with_context(
        self,
        sign: Sign,
        numerator: &BigInt,
        denominator: &BigInt,
        ctx: &mut Context,
    ) -> u64 {
        if numerator.is_zero() {
            return self.sign_bits(sign);
        }
        // floor(log2(numerator / denominator)) is either this or one less
        let mut lead_exponent = numerator.bits() as i64 - denominator.bits() as i64;
        let (shifted_numerator, shifted_denominator) =
            shift_ratio(numerator, denominator, lead_exponent);
        if shifted_numerator < shifted_denominator {
            lead_exponent -= 1;
        }
        if let Some(bits) =
            self.encode_out_of_range(sign, &FastInteger::from_i64(lead_exponent), ctx)
        {
            return bits;
        }
        let fraction_width = self.fraction_width as i64;
        let mut ulp_exponent =
            lead_exponent.max(self.exponent_min_normal()) - fraction_width;
        let (scaled_numerator, scaled_denominator) =
            shift_ratio(numerator, denominator, ulp_exponent);
        let (mantissa, inexact) = round_quotient(
            &scaled_numerator,
            &scaled_denominator,
            sign,
            ctx.rounding_mode,
        );
        let mut mantissa = mantissa
            .to_u64()
            .expect("rounded mantissa fits in u64");
        if mantissa == 1 << (self.fraction_width + 1) {
            mantissa >>= 1;
            ulp_exponent += 1;
        }
        if inexact {
            ctx.status_flags |= StatusFlags::INEXACT;
            if lead_exponent < self.exponent_min_normal() {
                ctx.status_flags |= StatusFlags::UNDERFLOW;
            }
        }
        if ulp_exponent + fraction_width > self.exponent_max_normal() {
            ctx.status_flags |= StatusFlags::OVERFLOW;
            return self.infinity_bits(sign);
        }
        let exponent_field = if mantissa >> self.fraction_width == 0 {
            0
        } else {
            (ulp_exponent + fraction_width + self.exponent_bias()) as u64
        };
        self.sign_bits(sign)
            | exponent_field << self.fraction_width
            | (mantissa & self.fraction_field_mask())
    }
}

/// returns `(numerator, denominator)` scaled so their quotient is divided by `2^exponent`
fn shift_ratio(numerator: &BigInt, denominator: &BigInt, exponent: i64) -> (BigInt, BigInt) {
    if exponent >= 0 {
        (numerator.clone(), denominator << exponent as usize)
    } else {
        (numerator << (-exponent) as usize, denominator.clone())
    }
}

impl EFloat {
    pub fn from_f32(value: f32) -> Self {
        MachineFormat::BINARY32.decode(value.to_bits().into())
    }
    pub fn from_f64(value: f64) -> Self {
        MachineFormat::BINARY64.decode(value.to_bits())
    }
    /// rounds ties to even
    pub fn to_f32(&self) -> f32 {
        let bits = MachineFormat::BINARY32.encode(self, None);
        f32::from_bits(bits.to_u32().expect("binary32 bits fit in u32"))
    }
    /// rounds ties to even
    pub fn to_f64(&self) -> f64 {
        f64::from_bits(MachineFormat::BINARY64.encode(self, None))
    }
}
