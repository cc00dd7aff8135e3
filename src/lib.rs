//! # Enum metadata cache (enum-cache)
//!
//! Builds, once per enum type, an immutable index over its members and
//! answers validation, flag, lookup, formatting and parsing queries without
//! reflection.
//!
//! ## Design
//!
//! A [`MemberCache`] is built in a single pass over declaration-ordered
//! [`MemberRecord`]s:
//!
//! ```text
//! members  [Red=1, Crimson=1, Green=2, Blue=4]     arena, declaration order
//! buckets  hash(value) -> first member of a chain  one entry per distinct value
//! aliases  Red -> Crimson                          same value, primary first
//! sorted   [Red, Green, Blue]                      primaries by ascending value
//! ```
//!
//! Value lookups hash into the bucket array, name lookups go through a map,
//! and ordered enumeration walks the sorted table. Caches are stored in a
//! [`CacheDirectory`] that readers query without locking.
//!
//! ```
//! use enum_cache::{EnumFormat, MemberCache, MemberRecord};
//!
//! let cache = MemberCache::build(
//!     [
//!         MemberRecord::new("Red", 1u8),
//!         MemberRecord::new("Green", 2),
//!         MemberRecord::new("Blue", 4),
//!     ],
//!     true,
//!     None,
//! );
//!
//! assert_eq!(cache.to_string(6, &[EnumFormat::Name]).unwrap().as_deref(), Some("Green, Blue"));
//! assert_eq!(cache.parse("Green, Blue", false, &[EnumFormat::Name]), Ok(6));
//! assert!(cache.is_valid(7));
//! assert!(!cache.is_valid(8));
//! ```

extern crate self as enum_cache;

pub mod builder;
pub mod cache;
pub mod directory;
pub mod error;
mod flags;
pub mod format;
pub mod hash;
pub mod kind;
pub mod member;
pub mod traits;

pub use builder::CacheBuilder;
pub use cache::{Aliases, EnumValidator, MemberCache, MemberSelection, Members};
pub use directory::{CacheDirectory, global_directory};
pub use enum_cache_macro::EnumMembers;
pub use error::{EnumCacheError, FormatError, ParseError};
pub use format::{
    CustomFormatFn, CustomFormatId, CustomFormats, DEFAULT_FORMATS, EnumFormat, FormatResolver,
    NoCustomFormats, ParseOptions,
};
pub use hash::fnv1a_64;
pub use kind::{Underlying, UnderlyingKind};
pub use member::{Attribute, AttributeSet, EnumMember, MemberRecord};
pub use traits::EnumMembers;
