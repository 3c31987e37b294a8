//! Byte-order handling for fixed-width primitives.
//!
//! The [`Element`](crate::Element) implementations use these helpers to move
//! samples between the byte order declared in a file and the host's native
//! representation. The [`ibm`] module converts the IBM System/360
//! hexadecimal floating-point format to and from IEEE-754.

use half::f16;

pub mod ibm;

/// The order in which the bytes of a multi-byte sample are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// The byte order of the host.
    #[cfg(target_endian = "little")]
    pub const NATIVE: ByteOrder = ByteOrder::Little;
    /// The byte order of the host.
    #[cfg(target_endian = "big")]
    pub const NATIVE: ByteOrder = ByteOrder::Big;

    /// Returns `true` if this is the byte order of the host.
    pub fn is_native(self) -> bool {
        self == Self::NATIVE
    }

    /// Converts a value stored in this byte order to the host's byte order.
    #[inline]
    pub fn to_native<T: SwapBytes>(self, value: T) -> T {
        if self.is_native() {
            value
        } else {
            value.byte_swapped()
        }
    }

    /// Converts a value in the host's byte order to this byte order.
    #[inline]
    pub fn from_native<T: SwapBytes>(self, value: T) -> T {
        // Swapping is an involution, so both directions are the same.
        self.to_native(value)
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::Little
    }
}

/// Reverses the byte order of a primitive.
///
/// Floating-point values are swapped by bit pattern, so NaN payloads and
/// signaling bits survive unchanged.
pub trait SwapBytes: Copy {
    fn byte_swapped(self) -> Self;
}

macro_rules! impl_swap_identity {
    ($($elem:ty),*) => {
        $(
            impl SwapBytes for $elem {
                #[inline]
                fn byte_swapped(self) -> Self {
                    self
                }
            }
        )*
    };
}

macro_rules! impl_swap_integer {
    ($($elem:ty),*) => {
        $(
            impl SwapBytes for $elem {
                #[inline]
                fn byte_swapped(self) -> Self {
                    self.swap_bytes()
                }
            }
        )*
    };
}

impl_swap_identity!(bool, i8, u8);
impl_swap_integer!(i32, u32, i64, u64);

// 16-bit values are a rotate by one byte.
impl SwapBytes for u16 {
    #[inline]
    fn byte_swapped(self) -> Self {
        self.rotate_left(8)
    }
}

impl SwapBytes for i16 {
    #[inline]
    fn byte_swapped(self) -> Self {
        (self as u16).rotate_left(8) as i16
    }
}

impl SwapBytes for f16 {
    #[inline]
    fn byte_swapped(self) -> Self {
        f16::from_bits(self.to_bits().byte_swapped())
    }
}

impl SwapBytes for f32 {
    #[inline]
    fn byte_swapped(self) -> Self {
        f32::from_bits(self.to_bits().byte_swapped())
    }
}

impl SwapBytes for f64 {
    #[inline]
    fn byte_swapped(self) -> Self {
        f64::from_bits(self.to_bits().byte_swapped())
    }
}
