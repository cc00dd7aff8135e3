//! Typed façade over the global directory.

use std::any::TypeId;
use std::sync::Arc;

use crate::cache::{EnumValidator, MemberCache};
use crate::directory::global_directory;
use crate::error::{EnumCacheError, ParseError};
use crate::format::EnumFormat;
use crate::kind::Underlying;
use crate::member::MemberRecord;

/// A fieldless enum with an explicit member table.
///
/// Usually derived with `#[derive(EnumMembers)]`; implement it by hand to
/// attach a custom validator or to describe members that aren't variants.
///
/// ```
/// use enum_cache::EnumMembers;
///
/// #[derive(Clone, Copy, Debug, PartialEq, EnumMembers)]
/// #[repr(u8)]
/// enum Color {
///     Red = 1,
///     #[enum_cache(alias = "Lime")]
///     Green = 2,
///     Blue = 4,
/// }
///
/// assert_eq!(Color::parse_member("lime", true), Ok(Color::Green));
/// assert_eq!(Color::Blue.member_name().as_deref(), Some("Blue"));
/// assert!(!Color::member_cache().unwrap().is_contiguous());
/// ```
pub trait EnumMembers: Sized + 'static {
    type Repr: Underlying;

    const IS_FLAGS: bool = false;

    fn to_repr(&self) -> Self::Repr;

    /// The variant declared with `value`, if any.
    fn from_repr(value: Self::Repr) -> Option<Self>;

    /// Every member in declaration order, aliases included.
    fn member_records() -> Vec<MemberRecord<Self::Repr>>;

    /// Replaces the default validity rule when present.
    fn validator() -> Option<Arc<dyn EnumValidator<Self::Repr>>> {
        None
    }

    /// This type's cache, built on first use and shared process-wide.
    ///
    /// `member_records` and `validator` run outside the directory lock, so
    /// they may themselves use other enums' caches.
    fn member_cache() -> Result<Arc<MemberCache<Self::Repr>>, EnumCacheError> {
        let key = TypeId::of::<Self>();
        if let Some(cache) = global_directory().get(&key)? {
            return Ok(cache);
        }
        let records = Self::member_records();
        let validator = Self::validator();
        global_directory().get_or_build(key, move || Ok(MemberCache::build(records, Self::IS_FLAGS, validator)))
    }

    /// Parse a member name (or a numeric literal naming a declared variant).
    ///
    /// Flag combinations aren't variants; parse those through
    /// [`MemberCache::parse`] instead.
    fn parse_member(text: &str, ignore_case: bool) -> Result<Self, ParseError> {
        let cache = Self::member_cache()?;
        let value = cache.parse(text, ignore_case, &[EnumFormat::Name])?;
        Self::from_repr(value).ok_or_else(|| ParseError::no_match(text.trim()))
    }

    /// Name of the primary member for this value.
    fn member_name(&self) -> Option<String> {
        let cache = Self::member_cache().ok()?;
        cache.get_member_by_value(self.to_repr()).map(|m| m.name().to_string())
    }

    /// `true` if the value passes the cache's validity rule.
    fn is_valid_member(&self) -> bool {
        Self::member_cache().is_ok_and(|cache| cache.is_valid(self.to_repr()))
    }
}
