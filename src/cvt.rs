//! Bit-level conversion between `f32` and the 8-bit fnuz layouts.
//!
//! Both formats share one implementation, parameterized by exponent width
//! `WE`, mantissa width `WM` and exponent `BIAS`. The payload is packed
//! MSB-first as sign, exponent, mantissa. There are no infinities and no
//! negative zero; `0x80` is the only NaN.

/// The only NaN payload: sign bit set, everything else clear.
pub const NAN_BITS: u8 = 0x80;

/// Exponent and mantissa bits of a payload.
const MAGNITUDE_MASK: u8 = 0x7F;

const F32_MANTISSA_BITS: u32 = 23;
const F32_BIAS: i32 = 127;

/// How `encode` disposes of the mantissa bits that do not fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoundingMode {
    /// Round to nearest, ties to even.
    #[default]
    NearestEven,
    /// Add caller-supplied random bits to the discarded fraction and keep the carry.
    Stochastic,
}

struct Geometry<const WE: u32, const WM: u32, const BIAS: i32>;

impl<const WE: u32, const WM: u32, const BIAS: i32> Geometry<WE, WM, BIAS> {
    const SUPPORTED: () = assert!(
        (WE == 4 && WM == 3 && BIAS == 8) || (WE == 5 && WM == 2 && BIAS == 16),
        "only the e4m3fnuz and e5m2fnuz geometries are supported"
    );
}

/// Widens a payload to `f32`. Every payload has an exact `f32` value, except
/// [`NAN_BITS`] which decodes to a quiet NaN.
#[must_use]
pub const fn decode<const WE: u32, const WM: u32, const BIAS: i32>(payload: u8) -> f32 {
    let () = Geometry::<WE, WM, BIAS>::SUPPORTED;

    if payload == NAN_BITS {
        return f32::NAN;
    }
    let sign = ((payload >> 7) as u32) << 31;
    let mut exponent = ((payload & MAGNITUDE_MASK) >> WM) as i32;
    let mut mantissa = (payload as u32) & ((1 << WM) - 1);

    if exponent == 0 {
        if mantissa == 0 {
            return f32::from_bits(sign);
        }
        // Subnormal: shift the leading one into the implicit position.
        let shift = mantissa.leading_zeros() - (u32::BITS - WM) + 1;
        mantissa = (mantissa << shift) & ((1 << WM) - 1);
        exponent = 1 - shift as i32;
    }

    let exponent = (exponent - BIAS + F32_BIAS) as u32;
    f32::from_bits(sign | exponent << F32_MANTISSA_BITS | mantissa << (F32_MANTISSA_BITS - WM))
}

/// All 256 decoded payloads, indexed by payload.
#[must_use]
pub const fn decode_table<const WE: u32, const WM: u32, const BIAS: i32>() -> [f32; 256] {
    let mut table = [0.0; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = decode::<WE, WM, BIAS>(i as u8);
        i += 1;
    }
    table
}

/// Narrows an `f32` to a payload.
///
/// NaN and both infinities map to [`NAN_BITS`]. Finite magnitudes above the
/// largest representable value clip to it with the sign preserved. Zero of
/// either sign, and anything that rounds to zero, maps to `0x00`.
///
/// `random_bits` is only read in [`RoundingMode::Stochastic`], where its low
/// `23 - WM` bits are added to the discarded part of the mantissa.
#[must_use]
pub fn encode<const WE: u32, const WM: u32, const BIAS: i32>(
    value: f32,
    mode: RoundingMode,
    random_bits: u32,
) -> u8 {
    let () = Geometry::<WE, WM, BIAS>::SUPPORTED;

    let bits = value.to_bits();
    if bits & 0x7F80_0000 == 0x7F80_0000 {
        return NAN_BITS;
    }
    if bits & 0x7FFF_FFFF == 0 {
        return 0;
    }

    let sign = (bits >> 31) as u8;
    let biased = ((bits >> F32_MANTISSA_BITS) & 0xFF) as i32;
    let mut mantissa = u64::from(bits & 0x7F_FFFF);

    let subnormal_exponent = 1 - BIAS;
    let (exponent, shift) = if biased == 0 {
        let exponent = 1 - F32_BIAS;
        (exponent, subnormal_exponent - exponent)
    } else {
        mantissa |= 1 << F32_MANTISSA_BITS;
        let exponent = biased - F32_BIAS;
        (exponent, (subnormal_exponent - exponent).max(0))
    };

    // Smaller than half of the smallest subnormal, under either mode.
    if shift > F32_MANTISSA_BITS as i32 + 1 {
        return 0;
    }
    let shift = shift as u32;
    let drop_bits = F32_MANTISSA_BITS - WM;

    // Ties must be judged before denormalizing: the shift can discard bits
    // that make a value look like an exact midpoint.
    let tie_mask = (1u64 << (drop_bits + shift)) - 1;
    let tie = mantissa & tie_mask == 1 << (drop_bits + shift - 1);
    mantissa >>= shift;

    let implicit_one = mantissa & (1 << F32_MANTISSA_BITS) != 0;
    let mut target_exponent = exponent + shift as i32 + BIAS - i32::from(!implicit_one);

    let drop_mask = (1u64 << drop_bits) - 1;
    let odd = mantissa & (1 << drop_bits) != 0;
    let increment = match mode {
        RoundingMode::NearestEven if tie && !odd => mantissa - 1,
        RoundingMode::NearestEven => mantissa,
        RoundingMode::Stochastic => u64::from(random_bits),
    };
    mantissa += increment & drop_mask;

    if target_exponent == 0 {
        // A subnormal that carried into the implicit bit is now the smallest normal.
        if mantissa & (1 << F32_MANTISSA_BITS) != 0 {
            target_exponent = 1;
        }
    } else if mantissa & (1 << (F32_MANTISSA_BITS + 1)) != 0 {
        mantissa >>= 1;
        target_exponent += 1;
    }
    mantissa >>= drop_bits;

    let max_exponent = (1 << WE) - 1;
    if target_exponent > max_exponent {
        return sign << 7 | MAGNITUDE_MASK;
    }

    let mantissa = (mantissa as u8) & ((1 << WM) - 1);
    if target_exponent == 0 && mantissa == 0 {
        return 0;
    }
    sign << 7 | (target_exponent as u8) << WM | mantissa
}

/// Narrows an `f64` to the `f32` that [`encode`] rounds the same way.
///
/// Inexact results are rounded to odd, which keeps a value just off a narrow
/// midpoint from landing on it. Finite values too large for `f32` become
/// `±f32::MAX` so they still clip instead of turning into NaN.
#[must_use]
pub(crate) fn narrow_f64(value: f64) -> f32 {
    let narrow = value as f32;
    if narrow.is_infinite() && value.is_finite() {
        return f32::MAX.copysign(value as f32);
    }
    if narrow.is_nan() || f64::from(narrow) == value {
        return narrow;
    }
    let bits = narrow.to_bits();
    let truncated = if f64::from(narrow).abs() > value.abs() { bits - 1 } else { bits };
    f32::from_bits(truncated | 1)
}
