use bytemuck::Pod;

use crate::cvt::{self, RoundingMode};

mod sealed {
    pub trait Sealed {}
}

pub(crate) use sealed::Sealed;

/// Geometry and boundary values shared by the 8-bit fnuz formats.
///
/// Only [`f8e4m3fnuz`](crate::f8e4m3fnuz) and [`f8e5m2fnuz`](crate::f8e5m2fnuz)
/// implement this trait. Every payload constant is derived from the three
/// geometry constants, the decimal ones are given per format.
pub trait NarrowFloat: Copy + Pod + Sealed {
    const EXPONENT_BITS: u32;
    const MANTISSA_BITS: u32;
    const BIAS: i32;

    /// Smallest positive normal value.
    const MIN_POSITIVE_BITS: u8 = 1 << Self::MANTISSA_BITS;
    /// Smallest positive subnormal value.
    const MIN_POSITIVE_SUBNORMAL_BITS: u8 = 0x01;
    /// Largest finite value.
    const MAX_BITS: u8 = 0x7F;
    /// Most negative finite value.
    const LOWEST_BITS: u8 = 0xFF;
    /// Difference between `1.0` and the next larger value.
    const EPSILON_BITS: u8 = ((Self::BIAS - Self::MANTISSA_BITS as i32) as u8) << Self::MANTISSA_BITS;
    /// Largest rounding error under nearest-even, `0.5`.
    const ROUND_ERROR_BITS: u8 = ((Self::BIAS - 1) as u8) << Self::MANTISSA_BITS;
    /// The only NaN. Also what `INFINITY` aliases, since no infinities exist.
    const NAN_BITS: u8 = cvt::NAN_BITS;
    const ONE_BITS: u8 = (Self::BIAS as u8) << Self::MANTISSA_BITS;

    const RADIX: u32 = 2;
    /// Significant binary digits, counting the implicit bit.
    const MANTISSA_DIGITS: u32 = Self::MANTISSA_BITS + 1;
    /// One more than the exponent of the smallest normal value.
    const MIN_EXP: i32 = 2 - Self::BIAS;
    /// One more than the exponent of the largest finite value.
    const MAX_EXP: i32 = (1 << Self::EXPONENT_BITS) - Self::BIAS;
    /// Decimal digits that survive a round trip through the format.
    const DIGITS: u32;
    /// Smallest `n` such that `10^n` is a normal value.
    const MIN_10_EXP: i32;
    /// Largest `n` such that `10^n` is finite.
    const MAX_10_EXP: i32;

    fn from_bits(bits: u8) -> Self;
    fn to_bits(self) -> u8;
    fn from_f32_with(value: f32, mode: RoundingMode, random_bits: u32) -> Self;
    fn to_f32(self) -> f32;

    /// Every payload decoded, indexed by payload.
    fn decode_table() -> &'static [f32; 256];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{f8e4m3fnuz, f8e5m2fnuz};

    fn value<T: NarrowFloat>(bits: u8) -> f32 {
        T::from_bits(bits).to_f32()
    }

    #[test]
    fn test_e4m3fnuz_limits() {
        type T = f8e4m3fnuz;
        assert_eq!(T::MIN_POSITIVE_BITS, 0x08);
        assert_eq!(T::EPSILON_BITS, 0x28);
        assert_eq!(T::ROUND_ERROR_BITS, 0x38);
        assert_eq!(T::ONE_BITS, 0x40);
        assert_eq!(value::<T>(T::MIN_POSITIVE_BITS), 2f32.powi(-7));
        assert_eq!(value::<T>(T::MIN_POSITIVE_SUBNORMAL_BITS), 2f32.powi(-10));
        assert_eq!(value::<T>(T::MAX_BITS), 240.0);
        assert_eq!(value::<T>(T::LOWEST_BITS), -240.0);
        assert_eq!(value::<T>(T::EPSILON_BITS), 0.125);
        assert_eq!(value::<T>(T::ROUND_ERROR_BITS), 0.5);
        assert_eq!(value::<T>(T::ONE_BITS), 1.0);
        assert!(value::<T>(T::NAN_BITS).is_nan());
        assert_eq!(T::MANTISSA_DIGITS, 4);
        assert_eq!(T::MIN_EXP, -6);
        assert_eq!(T::MAX_EXP, 8);
    }

    #[test]
    fn test_e5m2fnuz_limits() {
        type T = f8e5m2fnuz;
        assert_eq!(T::MIN_POSITIVE_BITS, 0x04);
        assert_eq!(T::EPSILON_BITS, 0x38);
        assert_eq!(T::ROUND_ERROR_BITS, 0x3C);
        assert_eq!(T::ONE_BITS, 0x40);
        assert_eq!(value::<T>(T::MIN_POSITIVE_BITS), 2f32.powi(-15));
        assert_eq!(value::<T>(T::MIN_POSITIVE_SUBNORMAL_BITS), 2f32.powi(-17));
        assert_eq!(value::<T>(T::MAX_BITS), 57344.0);
        assert_eq!(value::<T>(T::LOWEST_BITS), -57344.0);
        assert_eq!(value::<T>(T::EPSILON_BITS), 0.25);
        assert_eq!(value::<T>(T::ROUND_ERROR_BITS), 0.5);
        assert!(value::<T>(T::NAN_BITS).is_nan());
        assert_eq!(T::MANTISSA_DIGITS, 3);
        assert_eq!(T::MIN_EXP, -14);
        assert_eq!(T::MAX_EXP, 16);
    }

    fn check_exponent_metadata<T: NarrowFloat>() {
        let min_positive = f64::from(value::<T>(T::MIN_POSITIVE_BITS));
        let max = f64::from(value::<T>(T::MAX_BITS));
        let epsilon = f64::from(value::<T>(T::EPSILON_BITS));

        assert_eq!(min_positive, 2f64.powi(T::MIN_EXP - 1));
        assert!(max < 2f64.powi(T::MAX_EXP) && max >= 2f64.powi(T::MAX_EXP - 1));
        assert_eq!(epsilon, 2f64.powi(1 - T::MANTISSA_DIGITS as i32));
        assert_eq!(T::MIN_10_EXP, min_positive.log10().ceil() as i32);
        assert_eq!(T::MAX_10_EXP, max.log10().floor() as i32);
        assert_eq!(
            T::DIGITS,
            (f64::from(T::MANTISSA_DIGITS - 1) * 2f64.log10()).floor() as u32
        );
    }

    #[test]
    fn test_exponent_metadata() {
        check_exponent_metadata::<f8e4m3fnuz>();
        check_exponent_metadata::<f8e5m2fnuz>();
    }

    #[test]
    fn test_decode_table_matches_engine() {
        fn check<T: NarrowFloat>() {
            for bits in 0..=u8::MAX {
                assert_eq!(
                    T::decode_table()[bits as usize].to_bits(),
                    T::from_bits(bits).to_f32().to_bits()
                );
            }
        }
        check::<f8e4m3fnuz>();
        check::<f8e5m2fnuz>();
    }
}
