//! Underlying kinds: the eight fixed-width integer representations an enum
//! can be backed by, and the value operations the cache needs from them.
//!
//! Everything above this module is written once against [`Underlying`] and
//! monomorphized per kind.

use std::fmt;
use std::hash::Hash;
use std::num::IntErrorKind;
use std::ops::{BitAnd, BitOr, BitXor, Not};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zerocopy::{Immutable, IntoBytes};

use crate::error::EnumCacheError;
use crate::hash::fnv1a_64;

/// Integer representation backing an enum type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnderlyingKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl UnderlyingKind {
    /// All supported kinds, narrowest first.
    pub const ALL: [UnderlyingKind; 8] = [
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
    ];

    /// Width in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::I8 | Self::U8 => 8,
            Self::I16 | Self::U16 => 16,
            Self::I32 | Self::U32 => 32,
            Self::I64 | Self::U64 => 64,
        }
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Rust primitive name (`"u8"`, `"i64"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
        }
    }
}

impl fmt::Display for UnderlyingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnderlyingKind {
    type Err = EnumCacheError;

    /// Resolve a primitive name. `usize`, `isize`, `u128`, `i128` and
    /// anything else are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EnumCacheError::UnsupportedKind { name: s.to_string() })
    }
}

/// Why a decimal literal was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralError {
    /// Well-formed but outside the kind's range.
    Overflow,
    /// Not a number at all.
    Malformed,
}

/// Value operations over one underlying kind.
pub trait Underlying:
    Copy
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + IntoBytes
    + Immutable
{
    const KIND: UnderlyingKind;
    const ZERO: Self;

    /// Number of set bits.
    fn bit_count(self) -> u32;

    /// Subtraction within the kind's range. Not used by the cache itself,
    /// which widens to `i128` for spans; provided for callers doing value
    /// arithmetic generically.
    fn checked_sub(self, rhs: Self) -> Option<Self>;

    /// Numeric literal construction; `None` when `n` doesn't fit.
    fn from_int_literal(n: i128) -> Option<Self>;

    /// Lossless widening.
    fn to_i128(self) -> i128;

    /// Two's-complement bit pattern, zero-extended to 64 bits.
    fn to_bits(self) -> u64;

    /// Inverse of [`Underlying::to_bits`]; high bits beyond the width are dropped.
    fn from_bits(bits: u64) -> Self;

    /// Parse a decimal literal with optional sign.
    ///
    /// The literal is read at `i128` width and then range-checked, so `-1`
    /// for an unsigned kind is `Overflow` and `-0` is zero.
    fn parse_decimal(text: &str) -> Result<Self, LiteralError> {
        let wide = text.parse::<i128>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => LiteralError::Overflow,
            _ => LiteralError::Malformed,
        })?;
        Self::from_int_literal(wide).ok_or(LiteralError::Overflow)
    }

    /// `true` when exactly one bit is set.
    #[inline]
    fn is_single_bit(self) -> bool {
        self.bit_count() == 1
    }

    /// Bucket hash over the native byte representation.
    #[inline]
    fn bucket_hash(self) -> u64 {
        fnv1a_64(self.as_bytes())
    }
}

macro_rules! impl_underlying {
    ($($ty:ty => $kind:ident, $unsigned:ty;)*) => {$(
        impl Underlying for $ty {
            const KIND: UnderlyingKind = UnderlyingKind::$kind;
            const ZERO: Self = 0;

            #[inline]
            fn bit_count(self) -> u32 {
                self.count_ones()
            }

            #[inline]
            fn checked_sub(self, rhs: Self) -> Option<Self> {
                <$ty>::checked_sub(self, rhs)
            }

            #[inline]
            fn from_int_literal(n: i128) -> Option<Self> {
                <$ty>::try_from(n).ok()
            }

            #[inline]
            fn to_i128(self) -> i128 {
                i128::from(self)
            }

            #[inline]
            fn to_bits(self) -> u64 {
                u64::from(self as $unsigned)
            }

            #[inline]
            fn from_bits(bits: u64) -> Self {
                bits as $unsigned as $ty
            }

        }
    )*};
}

impl_underlying! {
    i8 => I8, u8;
    u8 => U8, u8;
    i16 => I16, u16;
    u16 => U16, u16;
    i32 => I32, u32;
    u32 => U32, u32;
    i64 => I64, u64;
    u64 => U64, u64;
}

/// Parse a hexadecimal digit string (no prefix) as the kind's bit pattern.
///
/// Signed kinds accept the full unsigned range and reinterpret it, so
/// `0xFF` parses to `-1i8`.
pub(crate) fn parse_hex_bits<U: Underlying>(digits: &str) -> Result<U, LiteralError> {
    if digits.is_empty() {
        return Err(LiteralError::Malformed);
    }
    let bits = u64::from_str_radix(digits, 16).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => LiteralError::Overflow,
        _ => LiteralError::Malformed,
    })?;
    let width = U::KIND.bits();
    if width < 64 && bits >> width != 0 {
        return Err(LiteralError::Overflow);
    }
    Ok(U::from_bits(bits))
}
