// SPDX-License-Identifier: LGPL-2.1-or-later
// See Notices.txt for copyright information

//! Ordering an [`ERational`] against decimal and binary floating values.
//!
//! The floating operand's exponent may be far too large to materialize a
//! power of its radix, so cheap bounds are tried first and the exact
//! cross-multiplication only runs when none of them decides.

use crate::Context;
use crate::EDecimal;
use crate::EFloat;
use crate::ERational;
use crate::Extended;
use crate::FastInteger;
use crate::Radix;
use crate::RoundingMode;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;
use num_traits::Zero;
use std::cmp::Ordering;
use tracing::trace;

impl ERational {
    /// Same total order as [`ERational::compare_to`], with `other` taken at
    /// its exact value.
    pub fn compare_to_decimal(&self, other: &EDecimal) -> Ordering {
        self.compare_to_extended(other)
    }
    /// Same total order as [`ERational::compare_to`], with `other` taken at
    /// its exact value.
    pub fn compare_to_float(&self, other: &EFloat) -> Ordering {
        self.compare_to_extended(other)
    }
    fn compare_to_extended<R: Radix>(&self, other: &Extended<R>) -> Ordering {
        if self.is_nan() || other.is_nan() {
            return self.is_nan().cmp(&other.is_nan());
        }
        let sign_cmp = self.sign().cmp(&other.sign());
        if sign_cmp != Ordering::Equal || self.is_zero() {
            return sign_cmp;
        }
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return self.flags().sign().apply(Ordering::Greater),
            (false, true) => return self.flags().sign().apply(Ordering::Less),
            (false, false) => {}
        }
        let exponent = other.fast_exponent();
        if exponent.is_zero() {
            return self
                .numerator()
                .cmp(&(self.denominator() * other.mantissa()));
        }
        let threshold = R::COMPARE_SHORTCUT_THRESHOLD;
        let beyond_threshold = exponent.compare_to_i32(threshold) == Ordering::Greater
            || exponent.compare_to_i32(-threshold) == Ordering::Less;
        if beyond_threshold {
            if let Some(magnitude_cmp) = self.compare_magnitude_shortcut(&other.abs()) {
                return self.flags().sign().apply(magnitude_cmp);
            }
        }
        trace!(radix = R::RADIX, %exponent, "comparing at full precision");
        self.compare_to(&ERational::from_extended(other))
    }
    /// Compares `|self|` with the finite, non-zero `magnitude`; `None` when
    /// no bound cheaper than the exact comparison decides.
    fn compare_magnitude_shortcut<R: Radix>(&self, magnitude: &Extended<R>) -> Option<Ordering> {
        let (quotient, remainder) = self.unsigned_numerator().div_rem(self.denominator());
        let lower = Extended::<R>::from_bigint(quotient.clone());
        if remainder.is_zero() {
            trace!(radix = R::RADIX, "rational is an integer");
            return Some(lower.compare_to(magnitude));
        }
        if lower.compare_to(magnitude) == Ordering::Greater {
            trace!(radix = R::RADIX, "integer part exceeds operand");
            return Some(Ordering::Greater);
        }
        let upper = Extended::<R>::from_bigint(quotient + BigInt::one());
        if upper.compare_to(magnitude) == Ordering::Less {
            trace!(radix = R::RADIX, "rounded-up integer part below operand");
            return Some(Ordering::Less);
        }
        let mut ctx = Context::new(R::COMPARE_WORKING_PRECISION, RoundingMode::TowardZero);
        let truncated = Extended::<R>::divide(
            self.unsigned_numerator(),
            self.denominator(),
            Some(&mut ctx),
        );
        if truncated.compare_to(magnitude) == Ordering::Greater {
            trace!(radix = R::RADIX, "truncated quotient exceeds operand");
            return Some(Ordering::Greater);
        }
        let exponent = magnitude.fast_exponent();
        if exponent.signum() > 0 {
            let numerator_digits = R::digit_count(self.unsigned_numerator());
            if FastInteger::from_u64(numerator_digits - 1) < *exponent {
                trace!(radix = R::RADIX, "numerator has too few digits");
                return Some(Ordering::Less);
            }
        }
        None
    }
}
