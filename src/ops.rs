//! Arithmetic on narrow floats.
//!
//! Every operation widens its operands, computes in `f32` (or `f64` when an
//! `f64` is involved) and, when the result is a narrow float, rounds it back
//! to nearest-even. Mixing with `f32`/`f64` yields the wide type; mixing with
//! integers converts the integer to the narrow type first.

use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::{Bounded, NumCast, One, ToPrimitive, Zero};

use crate::{f8e4m3fnuz, f8e5m2fnuz};

macro_rules! binary_op {
    ($name:ident, $op:ident, $method:ident, $op_assign:ident, $method_assign:ident, $tok:tt) => {
        impl $op for $name {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self::from_f32(self.to_f32() $tok rhs.to_f32())
            }
        }

        impl $op_assign for $name {
            fn $method_assign(&mut self, rhs: Self) {
                *self = *self $tok rhs;
            }
        }

        impl $op<f32> for $name {
            type Output = f32;

            fn $method(self, rhs: f32) -> f32 {
                self.to_f32() $tok rhs
            }
        }

        impl $op<$name> for f32 {
            type Output = f32;

            fn $method(self, rhs: $name) -> f32 {
                self $tok rhs.to_f32()
            }
        }

        impl $op_assign<$name> for f32 {
            fn $method_assign(&mut self, rhs: $name) {
                *self = *self $tok rhs.to_f32();
            }
        }

        impl $op<f64> for $name {
            type Output = f64;

            fn $method(self, rhs: f64) -> f64 {
                self.to_f64() $tok rhs
            }
        }

        impl $op<$name> for f64 {
            type Output = f64;

            fn $method(self, rhs: $name) -> f64 {
                self $tok rhs.to_f64()
            }
        }

        binary_op!(@int $name, $op, $method, $tok, i32);
        binary_op!(@int $name, $op, $method, $tok, i64);
    };
    (@int $name:ident, $op:ident, $method:ident, $tok:tt, $int:ty) => {
        impl $op<$int> for $name {
            type Output = Self;

            fn $method(self, rhs: $int) -> Self {
                self $tok Self::from_f32(rhs as f32)
            }
        }

        impl $op<$name> for $int {
            type Output = $name;

            fn $method(self, rhs: $name) -> $name {
                $name::from_f32(self as f32) $tok rhs
            }
        }
    };
}

macro_rules! numeric {
    ($name:ident) => {
        binary_op!($name, Add, add, AddAssign, add_assign, +);
        binary_op!($name, Sub, sub, SubAssign, sub_assign, -);
        binary_op!($name, Mul, mul, MulAssign, mul_assign, *);
        binary_op!($name, Div, div, DivAssign, div_assign, /);

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self::from_f32(-self.to_f32())
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self::from_f32(iter.map($name::to_f32).sum())
            }
        }

        impl<'a> Sum<&'a $name> for $name {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.copied().sum()
            }
        }

        impl Product for $name {
            fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self::from_f32(iter.map($name::to_f32).product())
            }
        }

        impl<'a> Product<&'a $name> for $name {
            fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.copied().product()
            }
        }

        impl Zero for $name {
            fn zero() -> Self {
                Self::ZERO
            }

            fn is_zero(&self) -> bool {
                self.to_bits() == 0
            }
        }

        impl One for $name {
            fn one() -> Self {
                Self::ONE
            }
        }

        impl Bounded for $name {
            fn min_value() -> Self {
                Self::MIN
            }

            fn max_value() -> Self {
                Self::MAX
            }
        }

        impl ToPrimitive for $name {
            fn to_i64(&self) -> Option<i64> {
                $name::to_f32(*self).to_i64()
            }

            fn to_u64(&self) -> Option<u64> {
                $name::to_f32(*self).to_u64()
            }

            fn to_f32(&self) -> Option<f32> {
                Some($name::to_f32(*self))
            }

            fn to_f64(&self) -> Option<f64> {
                Some($name::to_f64(*self))
            }
        }

        impl NumCast for $name {
            fn from<T: ToPrimitive>(n: T) -> Option<Self> {
                n.to_f32().map(Self::from_f32)
            }
        }
    };
}

numeric!(f8e4m3fnuz);
numeric!(f8e5m2fnuz);
