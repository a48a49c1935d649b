use std::cmp::Ordering;
use std::fmt;

use bytemuck::{Pod, Zeroable};
use rand::Rng;

use crate::cvt::{self, RoundingMode};
use crate::format::{NarrowFloat, Sealed};

macro_rules! narrow_float {
    (
        $(#[$attr:meta])*
        $name:ident,
        exponent: $we:literal,
        mantissa: $wm:literal,
        bias: $bias:literal,
        digits: $digits:literal,
        min_10_exp: $min_10_exp:literal,
        max_10_exp: $max_10_exp:literal $(,)?
    ) => {
        $(#[$attr])*
        #[allow(non_camel_case_types)]
        #[repr(transparent)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Clone, Copy, Default, Zeroable, Pod)]
        pub struct $name(u8);

        impl $name {
            pub const ZERO: Self = Self(0);
            pub const ONE: Self = Self(<Self as NarrowFloat>::ONE_BITS);
            pub const MIN_POSITIVE: Self = Self(<Self as NarrowFloat>::MIN_POSITIVE_BITS);
            pub const MIN_POSITIVE_SUBNORMAL: Self =
                Self(<Self as NarrowFloat>::MIN_POSITIVE_SUBNORMAL_BITS);
            pub const MAX: Self = Self(<Self as NarrowFloat>::MAX_BITS);
            pub const MIN: Self = Self(<Self as NarrowFloat>::LOWEST_BITS);
            pub const EPSILON: Self = Self(<Self as NarrowFloat>::EPSILON_BITS);
            pub const ROUND_ERROR: Self = Self(<Self as NarrowFloat>::ROUND_ERROR_BITS);
            pub const NAN: Self = Self(<Self as NarrowFloat>::NAN_BITS);
            /// There are no infinities; this is the NaN payload.
            pub const INFINITY: Self = Self::NAN;

            /// Wraps a raw payload without any rounding.
            #[inline]
            #[must_use]
            pub const fn from_bits(bits: u8) -> Self {
                Self(bits)
            }

            #[inline]
            #[must_use]
            pub const fn to_bits(self) -> u8 {
                self.0
            }

            /// Rounds to nearest, ties to even. Out-of-range values clip to
            /// [`Self::MAX`] or [`Self::MIN`]; NaN and infinities become [`Self::NAN`].
            #[inline]
            #[must_use]
            pub fn from_f32(value: f32) -> Self {
                Self::from_f32_with(value, RoundingMode::NearestEven, 0)
            }

            #[inline]
            #[must_use]
            pub fn from_f32_with(value: f32, mode: RoundingMode, random_bits: u32) -> Self {
                Self(cvt::encode::<$we, $wm, $bias>(value, mode, random_bits))
            }

            /// Stochastic rounding with entropy drawn from `rng`.
            #[inline]
            #[must_use]
            pub fn from_f32_stochastic<R: Rng + ?Sized>(value: f32, rng: &mut R) -> Self {
                Self::from_f32_with(value, RoundingMode::Stochastic, rng.gen())
            }

            /// Rounds `value` to nearest-even, as if it were converted directly.
            #[inline]
            #[must_use]
            pub fn from_f64(value: f64) -> Self {
                Self::from_f32(cvt::narrow_f64(value))
            }

            /// Exact for every payload except NaN.
            #[inline]
            #[must_use]
            pub const fn to_f32(self) -> f32 {
                cvt::decode::<$we, $wm, $bias>(self.0)
            }

            #[inline]
            #[must_use]
            pub fn to_f64(self) -> f64 {
                f64::from(self.to_f32())
            }

            #[inline]
            #[must_use]
            pub const fn is_nan(self) -> bool {
                self.0 == cvt::NAN_BITS
            }

            /// Always `false`: the format has no infinities.
            #[inline]
            #[must_use]
            pub const fn is_infinite(self) -> bool {
                false
            }

            #[inline]
            #[must_use]
            pub const fn is_finite(self) -> bool {
                !self.is_nan()
            }

            #[inline]
            #[must_use]
            pub const fn is_sign_negative(self) -> bool {
                self.0 & 0x80 != 0
            }

            #[inline]
            #[must_use]
            pub const fn is_sign_positive(self) -> bool {
                !self.is_sign_negative()
            }
        }

        impl Sealed for $name {}

        impl NarrowFloat for $name {
            const EXPONENT_BITS: u32 = $we;
            const MANTISSA_BITS: u32 = $wm;
            const BIAS: i32 = $bias;
            const DIGITS: u32 = $digits;
            const MIN_10_EXP: i32 = $min_10_exp;
            const MAX_10_EXP: i32 = $max_10_exp;

            fn from_bits(bits: u8) -> Self {
                Self(bits)
            }

            fn to_bits(self) -> u8 {
                self.0
            }

            fn from_f32_with(value: f32, mode: RoundingMode, random_bits: u32) -> Self {
                $name::from_f32_with(value, mode, random_bits)
            }

            fn to_f32(self) -> f32 {
                $name::to_f32(self)
            }

            fn decode_table() -> &'static [f32; 256] {
                static TABLE: [f32; 256] = cvt::decode_table::<$we, $wm, $bias>();
                &TABLE
            }
        }

        impl From<f32> for $name {
            fn from(value: f32) -> Self {
                Self::from_f32(value)
            }
        }

        impl From<$name> for f32 {
            fn from(value: $name) -> f32 {
                value.to_f32()
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> f64 {
                value.to_f64()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.to_f32() == other.to_f32()
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                self.to_f32().partial_cmp(&other.to_f32())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:#04x})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.to_f32(), f)
            }
        }

        impl fmt::LowerExp for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::LowerExp::fmt(&self.to_f32(), f)
            }
        }
    };
}

narrow_float! {
    /// 8-bit float with 4 exponent bits, 3 mantissa bits and bias 8.
    ///
    /// Layout `s eeee mmm`. No infinities and no negative zero: `0x80` is the
    /// only NaN. The finite range is `[-240, 240]`.
    f8e4m3fnuz,
    exponent: 4,
    mantissa: 3,
    bias: 8,
    digits: 0,
    min_10_exp: -2,
    max_10_exp: 2,
}

narrow_float! {
    /// 8-bit float with 5 exponent bits, 2 mantissa bits and bias 16.
    ///
    /// Layout `s eeeee mm`. No infinities and no negative zero: `0x80` is the
    /// only NaN. The finite range is `[-57344, 57344]`.
    f8e5m2fnuz,
    exponent: 5,
    mantissa: 2,
    bias: 16,
    digits: 0,
    min_10_exp: -4,
    max_10_exp: 4,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_f8e4m3fnuz() {
        assert_eq!(f32::from(f8e4m3fnuz::from_bits(0b0100_0000)), 1.0);
        assert_eq!(f32::from(f8e4m3fnuz::from_bits(0b0011_1000)), 0.5);
        assert_eq!(f32::from(f8e4m3fnuz::from_bits(0b0011_0000)), 0.25);
        assert_eq!(f32::from(f8e4m3fnuz::from_bits(0b0011_1001)), 0.5625);
        assert_eq!(f32::from(f8e4m3fnuz::from_bits(0b0011_1111)), 0.9375);
        assert_eq!(f32::from(f8e4m3fnuz::from_bits(0b1100_0010)), -1.25);

        assert_eq!(f8e4m3fnuz::from(0.5).to_bits(), 0b0011_1000);
        assert_eq!(f8e4m3fnuz::from(0.5625).to_bits(), 0b0011_1001);
        assert_eq!(f8e4m3fnuz::from(0.9375).to_bits(), 0b0011_1111);
        assert_eq!(f8e4m3fnuz::from(300.0).to_bits(), f8e4m3fnuz::MAX.to_bits());
        assert_eq!(f8e4m3fnuz::from(-300.0).to_bits(), f8e4m3fnuz::MIN.to_bits());
        assert_eq!(f8e4m3fnuz::from_f64(0.25).to_bits(), 0b0011_0000);
        assert_eq!(f8e4m3fnuz::from_bits(0x41).to_f64(), 1.125);
    }

    #[test]
    fn test_f8e5m2fnuz() {
        assert_eq!(f32::from(f8e5m2fnuz::from_bits(0b0100_0000)), 1.0);
        assert_eq!(f32::from(f8e5m2fnuz::from_bits(0b0100_0011)), 1.75);
        assert_eq!(f32::from(f8e5m2fnuz::from_bits(0b0011_1110)), 0.75);

        assert_eq!(f8e5m2fnuz::from(0.75).to_bits(), 0b0011_1110);
        assert_eq!(f8e5m2fnuz::from(1e9).to_bits(), f8e5m2fnuz::MAX.to_bits());
        assert_eq!(f8e5m2fnuz::from(-1e9).to_bits(), f8e5m2fnuz::MIN.to_bits());
    }

    #[test]
    fn test_predicates() {
        assert!(f8e4m3fnuz::NAN.is_nan());
        assert!(f8e5m2fnuz::from(f32::NAN).is_nan());
        assert!(f8e4m3fnuz::from(f32::INFINITY).is_nan());
        assert!(!f8e4m3fnuz::MAX.is_nan());
        assert!(!f8e4m3fnuz::from(f32::INFINITY).is_infinite());
        assert!(!f8e5m2fnuz::INFINITY.is_infinite());
        assert_eq!(f8e5m2fnuz::INFINITY.to_bits(), f8e5m2fnuz::NAN.to_bits());
        assert!(f8e4m3fnuz::MIN.is_sign_negative());
        assert!(f8e4m3fnuz::from(-0.0).is_sign_positive());
        assert!(f8e4m3fnuz::ONE.is_finite());
        assert!(!f8e4m3fnuz::NAN.is_finite());
    }

    #[test]
    fn test_comparison_follows_f32() {
        assert_ne!(f8e4m3fnuz::NAN, f8e4m3fnuz::NAN);
        assert_eq!(f8e4m3fnuz::ONE, f8e4m3fnuz::from(1.0));
        assert!(f8e4m3fnuz::MIN < f8e4m3fnuz::ZERO);
        assert!(f8e5m2fnuz::from(-2.0) < f8e5m2fnuz::from(-1.0));
        assert_eq!(f8e4m3fnuz::NAN.partial_cmp(&f8e4m3fnuz::ONE), None);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(f8e4m3fnuz::from(1.5).to_string(), "1.5");
        assert_eq!(f8e5m2fnuz::MAX.to_string(), "57344");
        assert_eq!(f8e4m3fnuz::NAN.to_string(), "NaN");
        assert_eq!(format!("{:e}", f8e4m3fnuz::MAX), "2.4e2");
        assert_eq!(format!("{:?}", f8e4m3fnuz::ONE), "f8e4m3fnuz(0x40)");
    }

    #[test]
    fn test_byte_layout() {
        assert_eq!(std::mem::size_of::<f8e4m3fnuz>(), 1);
        assert_eq!(std::mem::size_of::<f8e5m2fnuz>(), 1);
        assert_eq!(f8e4m3fnuz::default().to_bits(), 0);
        let values: [f8e4m3fnuz; 2] = bytemuck::cast([0x40u8, 0xC8]);
        assert_eq!(values[0].to_f32(), 1.0);
        assert_eq!(values[1].to_f32(), -2.0);
    }

    #[test]
    fn test_stochastic_unbiased() {
        // Halfway between 1.0 (0x40) and 1.125 (0x41).
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let samples = 20_000;
        let ups = (0..samples)
            .filter(|_| f8e4m3fnuz::from_f32_stochastic(1.0625, &mut rng).to_bits() == 0x41)
            .count();
        let ratio = ups as f64 / samples as f64;
        assert!((ratio - 0.5).abs() < 0.02, "ratio {ratio}");

        // A quarter of the way from 1.0 (0x40) to 1.25 (0x41).
        let ups = (0..samples)
            .filter(|_| f8e5m2fnuz::from_f32_stochastic(1.0625, &mut rng).to_bits() == 0x41)
            .count();
        let ratio = ups as f64 / samples as f64;
        assert!((ratio - 0.25).abs() < 0.02, "ratio {ratio}");
    }

    #[test]
    fn test_stochastic_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        let value = 3.3f32;
        let samples = 20_000;
        let mean = (0..samples)
            .map(|_| f8e4m3fnuz::from_f32_stochastic(value, &mut rng).to_f64())
            .sum::<f64>()
            / samples as f64;
        // Neighbours are 3.25 and 3.5; nearest-even would always give 3.25.
        assert!((mean - f64::from(value)).abs() < 0.01, "mean {mean}");
        assert_eq!(f8e4m3fnuz::from(value).to_f32(), 3.25);
    }

    #[test]
    fn test_from_f64_rounds_once() {
        let above = 1.0625 + 2f64.powi(-40);
        assert_eq!(f8e4m3fnuz::from_f64(above).to_bits(), 0x41);
        assert_eq!(f8e4m3fnuz::from_f64(1.0625).to_bits(), 0x40);
        assert_eq!(f8e4m3fnuz::from_f64(1.0625 - 2f64.powi(-40)).to_bits(), 0x40);
        assert_eq!(f8e4m3fnuz::from_f64(-above).to_bits(), 0xC1);
        assert_eq!(f8e5m2fnuz::from_f64(1.125 + 2f64.powi(-40)).to_bits(), 0x41);
        assert_eq!(f8e5m2fnuz::from_f64(1.125).to_bits(), 0x40);

        assert_eq!(f8e4m3fnuz::from_f64(1e300).to_bits(), f8e4m3fnuz::MAX.to_bits());
        assert_eq!(f8e4m3fnuz::from_f64(-1e300).to_bits(), f8e4m3fnuz::MIN.to_bits());
        assert_eq!(f8e5m2fnuz::from_f64(1e300).to_bits(), f8e5m2fnuz::MAX.to_bits());
        assert_eq!(f8e4m3fnuz::from_f64(1e-300).to_bits(), 0x00);
        assert_eq!(f8e4m3fnuz::from_f64(-1e-300).to_bits(), 0x00);
        assert!(f8e4m3fnuz::from_f64(f64::NAN).is_nan());
        assert!(f8e5m2fnuz::from_f64(f64::NEG_INFINITY).is_nan());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_raw_byte() {
        let one = f8e4m3fnuz::from_bits(0x40);
        assert_eq!(serde_json::to_string(&one).unwrap(), "64");
        let back: f8e4m3fnuz = serde_json::from_str("64").unwrap();
        assert_eq!(back.to_bits(), 0x40);

        let nan = serde_json::to_string(&f8e5m2fnuz::NAN).unwrap();
        assert_eq!(nan, "128");
        let back: f8e5m2fnuz = serde_json::from_str(&nan).unwrap();
        assert!(back.is_nan());
    }
}
