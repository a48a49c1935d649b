//! Conversions over whole buffers.
//!
//! A buffer of narrow floats is stored as exactly one byte per value, so
//! [`as_bytes`] and [`from_bytes`] reinterpret without copying.

use rand::Rng;

use crate::cvt::RoundingMode;
use crate::format::NarrowFloat;

/// Errors returned by the slice conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SliceError {
    /// Source and destination have different element counts.
    #[error("source has {src} elements but destination has {dst}")]
    LengthMismatch { src: usize, dst: usize },
}

fn check_len(src: usize, dst: usize) -> Result<(), SliceError> {
    if src != dst {
        return Err(SliceError::LengthMismatch { src, dst });
    }
    Ok(())
}

/// Narrows `src` into `dst` with nearest-even rounding.
pub fn encode_slice<T: NarrowFloat>(src: &[f32], dst: &mut [T]) -> Result<(), SliceError> {
    check_len(src.len(), dst.len())?;
    log::trace!("encoding {} values", src.len());
    for (out, &value) in dst.iter_mut().zip(src) {
        *out = T::from_f32_with(value, RoundingMode::NearestEven, 0);
    }
    Ok(())
}

/// Narrows `src` into `dst` with stochastic rounding, drawing one `u32` of
/// entropy from `rng` per value.
pub fn encode_slice_stochastic<T: NarrowFloat, R: Rng + ?Sized>(
    src: &[f32],
    dst: &mut [T],
    rng: &mut R,
) -> Result<(), SliceError> {
    check_len(src.len(), dst.len())?;
    log::trace!("encoding {} values with stochastic rounding", src.len());
    for (out, &value) in dst.iter_mut().zip(src) {
        *out = T::from_f32_with(value, RoundingMode::Stochastic, rng.gen());
    }
    Ok(())
}

/// Widens `src` into `dst` through the precomputed decode table.
pub fn decode_slice<T: NarrowFloat>(src: &[T], dst: &mut [f32]) -> Result<(), SliceError> {
    check_len(src.len(), dst.len())?;
    log::trace!("decoding {} values", src.len());
    let table = T::decode_table();
    for (out, value) in dst.iter_mut().zip(src) {
        *out = table[value.to_bits() as usize];
    }
    Ok(())
}

/// The raw payloads of `values`.
pub fn as_bytes<T: NarrowFloat>(values: &[T]) -> &[u8] {
    bytemuck::cast_slice(values)
}

/// Reinterprets raw payloads as narrow floats. No rounding takes place.
pub fn from_bytes<T: NarrowFloat>(bytes: &[u8]) -> &[T] {
    bytemuck::cast_slice(bytes)
}

/// Mutable counterpart of [`from_bytes`].
pub fn from_bytes_mut<T: NarrowFloat>(bytes: &mut [u8]) -> &mut [T] {
    bytemuck::cast_slice_mut(bytes)
}
