//! 8-bit floating point types in the "fnuz" style: finite, with no negative
//! zero and a single NaN payload.
//!
//! | type | layout | bias | largest finite |
//! |---|---|---|---|
//! | [`f8e4m3fnuz`] | `s eeee mmm` | 8 | 240 |
//! | [`f8e5m2fnuz`] | `s eeeee mm` | 16 | 57344 |
//!
//! `0x80` (negative zero in IEEE terms) is NaN. Conversions from `f32`
//! saturate instead of overflowing, map NaN and both infinities to NaN, and
//! round either to nearest-even or stochastically with caller-supplied
//! entropy. Arithmetic is carried out in `f32` and rounded back.
//!
//! ```
//! use fnuz8::{f8e4m3fnuz, RoundingMode};
//!
//! let x = f8e4m3fnuz::from_f32(1.3);
//! assert_eq!(x.to_f32(), 1.25);
//! assert_eq!(f8e4m3fnuz::from_f32(1000.0), f8e4m3fnuz::MAX);
//! assert!(f8e4m3fnuz::from_f32(f32::INFINITY).is_nan());
//!
//! let up = f8e4m3fnuz::from_f32_with(1.3, RoundingMode::Stochastic, u32::MAX);
//! assert_eq!(up.to_f32(), 1.375);
//! ```

mod cvt;
mod f8;
mod format;
#[cfg(feature = "mmap")]
mod forever_vec;
mod ops;
pub mod slice;

pub use cvt::{decode, decode_table, encode, RoundingMode, NAN_BITS};
pub use f8::{f8e4m3fnuz, f8e5m2fnuz};
pub use format::NarrowFloat;
#[cfg(feature = "mmap")]
pub use forever_vec::ForeverVec;
pub use slice::SliceError;
