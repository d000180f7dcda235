use std::fmt::{Debug, Display};
use std::ops::{Add, BitAnd, BitXor, Mul, Sub};
use std::str::FromStr;

/// Integer types that can be stored in a [`crate::Tensor`]
///
/// Nothing restricts the values to {0, 1}. Algorithms that work over GF(2) reduce with
/// [`Element::mod2`] after combining entries, which also handles the `-1` entries of a
/// Hadamard matrix the same way two's complement `x & 1` does.
pub trait Element:
    Copy
    + PartialEq
    + Debug
    + Display
    + FromStr
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + BitAnd<Output = Self>
    + BitXor<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;

    /// `self + rhs`, wrapping around at the bounds of the type
    ///
    /// Wrapping keeps the low bit exact, so the residue modulo 2 is unaffected.
    fn wrapping_add(self, rhs: Self) -> Self;

    /// `self - rhs`, wrapping around at the bounds of the type
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// `self * rhs`, wrapping around at the bounds of the type
    fn wrapping_mul(self, rhs: Self) -> Self;

    /// Residue modulo 2
    #[inline]
    fn mod2(self) -> Self {
        self & Self::ONE
    }

    #[inline]
    fn is_odd(self) -> bool {
        self.mod2() == Self::ONE
    }

    /// Parity of `self * rhs`, computed without overflowing
    #[inline]
    fn mul_mod2(self, rhs: Self) -> Self {
        (self & rhs) & Self::ONE
    }

    /// Parity of `self + rhs`, computed without overflowing
    #[inline]
    fn add_mod2(self, rhs: Self) -> Self {
        (self ^ rhs) & Self::ONE
    }

    #[inline]
    fn from_bool(b: bool) -> Self {
        if b {
            Self::ONE
        } else {
            Self::ZERO
        }
    }
}

macro_rules! impl_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;

                #[inline]
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$t>::wrapping_add(self, rhs)
                }

                #[inline]
                fn wrapping_sub(self, rhs: Self) -> Self {
                    <$t>::wrapping_sub(self, rhs)
                }

                #[inline]
                fn wrapping_mul(self, rhs: Self) -> Self {
                    <$t>::wrapping_mul(self, rhs)
                }
            }
        )*
    };
}

impl_element!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
