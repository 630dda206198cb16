//! Conversion between floats and packed representations.
//!
//! Normalized integers map `[0, 1]` (unsigned) or `[-1, 1]` (signed) onto the
//! full integer range. Signed values follow the GPU convention: both `MIN` and
//! `MIN + 1` unpack to `-1.0`, and packing `-1.0` yields `MIN + 1`.
//!
//! Half floats are IEEE 754 binary16, handled by the `half` crate.

use half::f16;

/// An integer type usable as a normalized fixed-point value.
pub trait Normalized: Copy {
    /// Encode a float, clamping to the representable range.
    fn pack(value: f32) -> Self;

    /// Decode to a float.
    fn unpack(self) -> f32;
}

macro_rules! impl_unsigned_normalized {
    ($($ty:ty),*) => {$(
        impl Normalized for $ty {
            #[inline]
            fn pack(value: f32) -> Self {
                (value.clamp(0.0, 1.0) * <$ty>::MAX as f32).round() as $ty
            }

            #[inline]
            fn unpack(self) -> f32 {
                self as f32 / <$ty>::MAX as f32
            }
        }
    )*};
}

macro_rules! impl_signed_normalized {
    ($($ty:ty),*) => {$(
        impl Normalized for $ty {
            #[inline]
            fn pack(value: f32) -> Self {
                (value.clamp(-1.0, 1.0) * <$ty>::MAX as f32).round() as $ty
            }

            #[inline]
            fn unpack(self) -> f32 {
                (self as f32 / <$ty>::MAX as f32).max(-1.0)
            }
        }
    )*};
}

impl_unsigned_normalized!(u8, u16);
impl_signed_normalized!(i8, i16);

/// Pack a float into a normalized integer.
///
/// ```ignore
/// let byte: u8 = pack(1.0); // 255
/// let short: i16 = pack(-1.0); // -32767
/// ```
#[inline]
pub fn pack<T: Normalized>(value: f32) -> T {
    T::pack(value)
}

/// Unpack a normalized integer into a float.
#[inline]
pub fn unpack<T: Normalized>(value: T) -> f32 {
    value.unpack()
}

/// Pack a float into half-float bits.
#[inline]
pub fn pack_half(value: f32) -> u16 {
    f16::from_f32(value).to_bits()
}

/// Unpack half-float bits into a float.
#[inline]
pub fn unpack_half(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}
