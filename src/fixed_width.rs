// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

use crate::round_quotient;
use crate::Decimal;
use crate::EDecimal;
use crate::ERational;
use crate::Error;
use crate::Extended;
use crate::FastInteger;
use crate::NumberFlags;
use crate::Radix;
use crate::Result;
use crate::RoundingMode;
use crate::Sign;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use num_traits::Signed;
use num_traits::ToPrimitive;
use num_traits::Zero;
use std::fmt;

// Sign bit of the flags word.
const SIGN_MASK: u32 = 0x8000_0000;

// Scale byte of the flags word: the power of ten the magnitude is divided by.
const SCALE_MASK: u32 = 0x00FF_0000;

const SCALE_SHIFT: u32 = 16;

const MAGNITUDE_BITS: u64 = 96;

/// A 96-bit unsigned magnitude with a sign and a decimal scale of `0..=28`,
/// stored as the four words `[lo, mid, hi, flags]`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct FixedDecimal {
    bits: [u32; 4],
}

impl FixedDecimal {
    pub const MAX_SCALE: u32 = 28;
    /// fails if any bit of the flags word outside the sign and scale is set,
    /// or the scale exceeds [`FixedDecimal::MAX_SCALE`]
    pub fn from_bits(bits: [u32; 4]) -> Result<Self> {
        let flags = bits[3];
        if flags & !(SIGN_MASK | SCALE_MASK) != 0 {
            return Err(Error::invalid_argument(
                "reserved bits of the flags word are set",
            ));
        }
        if (flags & SCALE_MASK) >> SCALE_SHIFT > Self::MAX_SCALE {
            return Err(Error::invalid_argument("scale is larger than 28"));
        }
        Ok(Self { bits })
    }
    pub fn bits(self) -> [u32; 4] {
        self.bits
    }
    pub fn encode(magnitude: &BigInt, scale: i32, negative: bool) -> Result<Self> {
        if magnitude.is_negative() {
            return Err(Error::invalid_argument("magnitude is negative"));
        }
        if magnitude.bits() > MAGNITUDE_BITS {
            return Err(Error::invalid_argument("magnitude doesn't fit in 96 bits"));
        }
        let scale = match scale.to_u32() {
            Some(scale) if scale <= Self::MAX_SCALE => scale,
            _ => return Err(Error::invalid_argument("scale is outside 0..=28")),
        };
        let mut bits = [0u32; 4];
        for (word, digit) in bits.iter_mut().zip(magnitude.to_u32_digits().1) {
            *word = digit;
        }
        bits[3] = scale << SCALE_SHIFT;
        if negative {
            bits[3] |= SIGN_MASK;
        }
        Ok(Self { bits })
    }
    /// returns `(magnitude, scale, negative)`
    pub fn decode(self) -> (BigInt, u32, bool) {
        (self.magnitude(), self.scale(), self.is_negative())
    }
    pub fn magnitude(self) -> BigInt {
        let [lo, mid, hi, _] = self.bits;
        let magnitude = u128::from(hi) << 64 | u128::from(mid) << 32 | u128::from(lo);
        magnitude.into()
    }
    pub fn scale(self) -> u32 {
        (self.bits[3] & SCALE_MASK) >> SCALE_SHIFT
    }
    pub fn is_negative(self) -> bool {
        self.bits[3] & SIGN_MASK != 0
    }
    pub fn to_decimal(self) -> EDecimal {
        EDecimal::from_parts(
            self.magnitude(),
            FastInteger::from_u64(self.scale().into()).neg(),
            NumberFlags::empty().with_sign(Sign::from_negative(self.is_negative())),
        )
    }
    /// Packs `numerator / denominator`: exactly at its smallest scale when
    /// that works, otherwise rounded half-even at the largest scale whose
    /// magnitude still fits.
    fn from_ratio(
        numerator: &BigInt,
        denominator: &BigInt,
        negative: bool,
        value: &impl fmt::Display,
    ) -> Result<Self> {
        if numerator.is_zero() {
            return Self::encode(numerator, 0, negative);
        }
        if numerator.bits() > denominator.bits() + MAGNITUDE_BITS + 1 {
            return Err(Error::overflow(value, "FixedDecimal"));
        }
        if denominator.bits() > numerator.bits() + MAGNITUDE_BITS + 1 {
            return Self::encode(&BigInt::zero(), Self::MAX_SCALE as i32, negative);
        }
        let limit = BigInt::one() << MAGNITUDE_BITS as usize;
        let gcd = numerator.gcd(denominator);
        let reduced_numerator = numerator / &gcd;
        if let Some((multiplier, scale)) = Decimal::terminating_scale(&(denominator / &gcd)) {
            let magnitude = reduced_numerator * multiplier;
            if scale <= u64::from(Self::MAX_SCALE) && magnitude < limit {
                return Self::encode(&magnitude, scale as i32, negative);
            }
        }
        let sign = Sign::from_negative(negative);
        for scale in (0..=Self::MAX_SCALE).rev() {
            let (magnitude, _) = round_quotient(
                &(numerator * Decimal::power(scale.into())),
                denominator,
                sign,
                RoundingMode::TiesToEven,
            );
            if magnitude < limit {
                return Self::encode(&magnitude, scale as i32, negative);
            }
        }
        Err(Error::overflow(value, "FixedDecimal"))
    }
}

impl<R: Radix> Extended<R> {
    /// Fails with an overflow for NaNs, infinities and magnitudes that don't
    /// fit in 96 bits even at scale 0.
    pub fn to_fixed_decimal(&self) -> Result<FixedDecimal> {
        if !self.is_finite() {
            return Err(Error::overflow(self, "FixedDecimal"));
        }
        let negative = self.is_negative();
        if self.is_zero() {
            return FixedDecimal::encode(&BigInt::zero(), 0, negative);
        }
        // digit counts of the 96-bit limit and of 10^29, in this radix
        let limit_digits = R::digit_count(&(BigInt::one() << MAGNITUDE_BITS as usize));
        let tiny_digits = R::digit_count(&Decimal::power(29));
        let adjusted_exponent = self
            .fast_exponent()
            .add(&FastInteger::from_u64(R::digit_count(self.unsigned_mantissa()) - 1));
        if adjusted_exponent >= FastInteger::from_u64(limit_digits) {
            return Err(Error::overflow(self, "FixedDecimal"));
        }
        if adjusted_exponent.add_i32(1) <= FastInteger::from_u64(tiny_digits).neg() {
            return FixedDecimal::encode(&BigInt::zero(), FixedDecimal::MAX_SCALE as i32, negative);
        }
        let exact = ERational::from_extended(self);
        FixedDecimal::from_ratio(
            exact.unsigned_numerator(),
            exact.denominator(),
            negative,
            self,
        )
    }
}

impl ERational {
    pub fn from_fixed_decimal(value: FixedDecimal) -> Self {
        Self::from_decimal(&value.to_decimal())
    }
    /// Fails with an overflow for NaNs, infinities and magnitudes that don't
    /// fit in 96 bits even at scale 0.
    pub fn to_fixed_decimal(&self) -> Result<FixedDecimal> {
        if !self.is_finite() {
            return Err(Error::overflow(self, "FixedDecimal"));
        }
        FixedDecimal::from_ratio(
            self.unsigned_numerator(),
            self.denominator(),
            self.is_negative(),
            self,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn r(numerator: i64, denominator: i64) -> ERational {
        ERational::new(numerator.into(), denominator.into()).unwrap()
    }

    fn dec(mantissa: i128, exponent: i64) -> EDecimal {
        EDecimal::new(mantissa.into(), exponent.into())
    }

    fn decoded(value: Result<FixedDecimal>) -> (String, u32, bool) {
        let (magnitude, scale, negative) = value.unwrap().decode();
        (magnitude.to_string(), scale, negative)
    }

    fn max_magnitude() -> BigInt {
        (BigInt::one() << 96usize) - 1u32
    }

    #[test]
    fn test_encode() {
        let value = FixedDecimal::encode(&12345.into(), 2, true).unwrap();
        assert_eq!(value.bits(), [12345, 0, 0, 0x8002_0000]);
        assert_eq!(value.decode(), (BigInt::from(12345), 2, true));
        let value = FixedDecimal::encode(&max_magnitude(), 28, false).unwrap();
        assert_eq!(value.bits(), [u32::MAX, u32::MAX, u32::MAX, 0x001C_0000]);
        assert_eq!(value.magnitude(), max_magnitude());
        let value = FixedDecimal::encode(&(BigInt::one() << 40usize), 0, false).unwrap();
        assert_eq!(value.bits(), [0, 1 << 8, 0, 0]);
    }

    #[test]
    fn test_encode_invalid() {
        let too_big = BigInt::one() << 96usize;
        for (magnitude, scale) in &[
            (too_big, 0),
            (BigInt::from(1), 29),
            (BigInt::from(1), -1),
            (BigInt::from(-1), 0),
            (BigInt::one() << 100usize, 29),
        ] {
            assert!(matches!(
                FixedDecimal::encode(magnitude, *scale, false),
                Err(Error::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn test_from_bits() {
        let value = FixedDecimal::from_bits([7, 0, 0, 0x8003_0000]).unwrap();
        assert_eq!(value.decode(), (BigInt::from(7), 3, true));
        assert!(FixedDecimal::from_bits([7, 0, 0, 0x001D_0000]).is_err());
        assert!(FixedDecimal::from_bits([7, 0, 0, 0x0000_0001]).is_err());
        assert!(FixedDecimal::from_bits([7, 0, 0, 0x4000_0000]).is_err());
    }

    #[test]
    fn test_to_decimal() {
        let value = FixedDecimal::encode(&12345.into(), 2, true).unwrap();
        assert_eq!(value.to_decimal(), dec(-12345, -2));
        assert_eq!(ERational::from_fixed_decimal(value), r(-12345, 100));
        let zero = FixedDecimal::encode(&BigInt::zero(), 4, true).unwrap().to_decimal();
        assert!(zero.is_zero() && zero.is_negative());
    }

    #[test]
    fn test_rational_exact() {
        assert_eq!(decoded(r(3, 2).to_fixed_decimal()), ("15".into(), 1, false));
        assert_eq!(decoded(r(-300, 1).to_fixed_decimal()), ("300".into(), 0, true));
        assert_eq!(decoded(r(6, 8).to_fixed_decimal()), ("75".into(), 2, false));
        assert_eq!(
            decoded(ERational::negative_zero().to_fixed_decimal()),
            ("0".into(), 0, true)
        );
    }

    #[test]
    fn test_rational_rounded() {
        assert_eq!(
            decoded(r(1, 3).to_fixed_decimal()),
            ("3333333333333333333333333333".into(), 28, false)
        );
        assert_eq!(
            decoded(r(-2, 3).to_fixed_decimal()),
            ("6666666666666666666666666667".into(), 28, true)
        );
        assert_eq!(
            decoded(r(100, 3).to_fixed_decimal()),
            ("33333333333333333333333333333".into(), 27, false)
        );
    }

    #[test]
    fn test_overflow() {
        let too_big = ERational::from_bigint(BigInt::one() << 96usize);
        assert!(matches!(
            too_big.to_fixed_decimal(),
            Err(Error::Overflow { .. })
        ));
        let largest = ERational::from_bigint(max_magnitude());
        assert_eq!(
            largest.to_fixed_decimal().unwrap().magnitude(),
            max_magnitude()
        );
        assert!(matches!(
            ERational::nan().to_fixed_decimal(),
            Err(Error::Overflow { .. })
        ));
        assert!(matches!(
            ERational::negative_infinity().to_fixed_decimal(),
            Err(Error::Overflow { .. })
        ));
        assert!(matches!(
            dec(1, 29).to_fixed_decimal(),
            Err(Error::Overflow { .. })
        ));
        assert!(matches!(
            dec(1, 1_000_000_000).to_fixed_decimal(),
            Err(Error::Overflow { .. })
        ));
        assert!(matches!(
            EDecimal::signaling_nan().to_fixed_decimal(),
            Err(Error::Overflow { .. })
        ));
    }

    #[test]
    fn test_extended() {
        assert_eq!(decoded(dec(-125, -2).to_fixed_decimal()), ("125".into(), 2, true));
        assert_eq!(decoded(dec(15, -29).to_fixed_decimal()), ("2".into(), 28, false));
        assert_eq!(decoded(dec(25, -29).to_fixed_decimal()), ("2".into(), 28, false));
        assert_eq!(
            decoded(dec(1, -1_000_000_000).to_fixed_decimal()),
            ("0".into(), 28, false)
        );
        assert_eq!(decoded(dec(3, 2).to_fixed_decimal()), ("300".into(), 0, false));
        let float = crate::EFloat::new(3.into(), (-1).into());
        assert_eq!(decoded(float.to_fixed_decimal()), ("15".into(), 1, false));
        let float = crate::EFloat::new(1.into(), 96.into());
        assert!(float.to_fixed_decimal().is_err());
        let float = crate::EFloat::new((-1).into(), (-500).into());
        assert_eq!(decoded(float.to_fixed_decimal()), ("0".into(), 28, true));
    }

    #[quickcheck]
    fn bits_round_trip(lo: u32, mid: u32, hi: u32, negative: bool, scale: u8) -> bool {
        let scale = u32::from(scale) % (FixedDecimal::MAX_SCALE + 1);
        let mut flags = scale << SCALE_SHIFT;
        if negative {
            flags |= SIGN_MASK;
        }
        let value = match FixedDecimal::from_bits([lo, mid, hi, flags]) {
            Ok(value) => value,
            Err(_) => return false,
        };
        let (magnitude, decoded_scale, decoded_negative) = value.decode();
        let encoded = FixedDecimal::encode(&magnitude, decoded_scale as i32, decoded_negative);
        decoded_scale == scale && decoded_negative == negative && encoded == Ok(value)
    }
}
