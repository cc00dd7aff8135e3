//! Error types.
//!
//! Lookups never fail: a miss is `None`. Everything that can be rejected
//! (parsing, custom format selection, kind checks) returns one of these.

use crate::kind::UnderlyingKind;

/// Errors raised while building, storing or validating caches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnumCacheError {
    /// The integer representation is not one of the eight supported kinds.
    #[error("unsupported underlying kind '{name}': expected one of i8, u8, i16, u16, i32, u32, i64, u64")]
    UnsupportedKind {
        /// The rejected representation name.
        name: String,
    },

    /// A directory entry was requested with a different kind than it was built with.
    #[error("cache kind mismatch: entry holds {found} values, requested {expected}")]
    KindMismatch {
        expected: UnderlyingKind,
        found: UnderlyingKind,
    },

    /// `validate` rejected a value.
    #[error("value {value} is not valid for this {kind} enum")]
    InvalidValue {
        /// Decimal rendering of the rejected value.
        value: String,
        kind: UnderlyingKind,
    },
}

/// Errors raised while formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A custom format id that the supplied resolver doesn't know.
    #[error("invalid format selector: custom format #{id} is not registered")]
    InvalidFormatSelector { id: u16 },

    /// Every custom format id is taken.
    #[error("custom format registry is full ({capacity} formats)")]
    RegistryFull { capacity: usize },
}

/// Errors raised while parsing text into a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No member, literal or flag combination matched.
    #[error("'{input}' does not match any member")]
    NoMatch { input: String },

    /// A numeric literal outside the kind's range.
    #[error("'{input}' is out of range for {kind}")]
    Overflow { input: String, kind: UnderlyingKind },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Cache(#[from] EnumCacheError),
}

impl ParseError {
    pub(crate) fn no_match(input: &str) -> Self {
        Self::NoMatch { input: input.to_string() }
    }
}
