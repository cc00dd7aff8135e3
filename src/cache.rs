//! Member cache: the immutable, queryable index produced by the builder.
//!
//! All members live in one arena in declaration order. Two index links hang
//! off each arena slot:
//!
//! - `bucket_next` chains value-group heads that share a hash bucket,
//! - `alias_next` chains the members of one value group, primary first.
//!
//! The sorted table lists the primaries by ascending value.

use std::collections::HashMap;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EnumCacheError;
use crate::hash::bucket_index;
use crate::kind::{Underlying, UnderlyingKind};
use crate::member::EnumMember;

/// Externally supplied validity predicate.
///
/// When installed, it decides `is_valid` on its own; the built-in flag and
/// defined-ness checks are skipped.
pub trait EnumValidator<U>: Send + Sync {
    fn is_valid(&self, value: U) -> bool;
}

impl<U, F> EnumValidator<U> for F
where
    F: Fn(U) -> bool + Send + Sync,
{
    #[inline]
    fn is_valid(&self, value: U) -> bool {
        self(value)
    }
}

/// Which members an enumeration yields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSelection {
    /// Every member, aliases included: value order, then alias-chain order.
    #[default]
    All,
    /// Primaries only.
    Distinct,
    /// Primaries whose value has exactly one bit set.
    Flags,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Link {
    pub(crate) alias_next: Option<usize>,
    pub(crate) bucket_next: Option<usize>,
}

/// Read-only metadata index for one enum type.
pub struct MemberCache<U: Underlying> {
    pub(crate) members: Vec<EnumMember<U>>,
    pub(crate) links: Vec<Link>,
    pub(crate) buckets: Box<[Option<usize>]>,
    pub(crate) sorted: Vec<usize>,
    pub(crate) names: HashMap<String, U>,
    pub(crate) folded_names: HashMap<String, U>,
    pub(crate) all_flags_mask: U,
    pub(crate) is_contiguous: bool,
    pub(crate) is_flags: bool,
    pub(crate) validator: Option<Arc<dyn EnumValidator<U>>>,
}

impl<U: Underlying> fmt::Debug for MemberCache<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberCache")
            .field("kind", &U::KIND)
            .field("members", &self.members.len())
            .field("distinct", &self.sorted.len())
            .field("all_flags_mask", &self.all_flags_mask)
            .field("is_contiguous", &self.is_contiguous)
            .field("is_flags", &self.is_flags)
            .field("custom_validator", &self.validator.is_some())
            .finish()
    }
}

impl<U: Underlying> MemberCache<U> {
    #[inline]
    pub fn kind(&self) -> UnderlyingKind {
        U::KIND
    }

    #[inline]
    pub fn is_flags_enum(&self) -> bool {
        self.is_flags
    }

    /// OR of every distinct single-bit value.
    #[inline]
    pub fn all_flags_mask(&self) -> U {
        self.all_flags_mask
    }

    #[inline]
    pub fn distinct_count(&self) -> usize {
        self.sorted.len()
    }

    /// Total number of members, aliases included.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `true` when the distinct values form one gap-free run.
    /// An empty cache is not contiguous.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        self.is_contiguous
    }

    #[inline]
    pub fn has_custom_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Smallest and largest defined values.
    pub fn value_range(&self) -> Option<(U, U)> {
        let first = *self.sorted.first()?;
        let last = *self.sorted.last()?;
        Some((self.members[first].value(), self.members[last].value()))
    }

    fn group_head(&self, value: U) -> Option<usize> {
        let mut cursor = self.buckets[bucket_index(value.bucket_hash(), self.buckets.len())];
        while let Some(i) = cursor {
            if self.members[i].value() == value {
                return Some(i);
            }
            cursor = self.links[i].bucket_next;
        }
        None
    }

    /// Primary member for `value`. Aliases are never returned directly.
    #[inline]
    pub fn get_member_by_value(&self, value: U) -> Option<&EnumMember<U>> {
        self.group_head(value).map(|i| &self.members[i])
    }

    /// Member lookup by name, aliases included; returns the owning primary.
    ///
    /// With `ignore_case`, an exact match is tried first. Among several
    /// differently-cased matches, the first in value-then-declaration order
    /// wins.
    pub fn get_member_by_name(&self, name: &str, ignore_case: bool) -> Option<&EnumMember<U>> {
        let value = match self.names.get(name) {
            Some(&value) => value,
            None if ignore_case => *self.folded_names.get(&name.to_lowercase())?,
            None => return None,
        };
        self.get_member_by_value(value)
    }

    #[inline]
    pub fn is_defined(&self, value: U) -> bool {
        self.group_head(value).is_some()
    }

    /// Validity: custom validator if installed; otherwise, for flags enums,
    /// defined or fully covered by single-bit members; otherwise defined.
    pub fn is_valid(&self, value: U) -> bool {
        if let Some(validator) = &self.validator {
            return validator.is_valid(value);
        }
        if self.is_flags {
            self.is_defined(value) || (value & !self.all_flags_mask) == U::ZERO
        } else {
            self.is_defined(value)
        }
    }

    /// `Ok(value)` if valid, otherwise [`EnumCacheError::InvalidValue`].
    pub fn validate(&self, value: U) -> Result<U, EnumCacheError> {
        if self.is_valid(value) {
            Ok(value)
        } else {
            Err(EnumCacheError::InvalidValue {
                value: value.to_string(),
                kind: U::KIND,
            })
        }
    }

    /// Ordered, restartable member sequence.
    pub fn get_members(&self, selection: MemberSelection) -> Members<'_, U> {
        Members {
            cache: self,
            selection,
            next_sorted: 0,
            alias_cursor: None,
            remaining: self.member_count(selection),
        }
    }

    pub fn member_count(&self, selection: MemberSelection) -> usize {
        match selection {
            MemberSelection::All => self.members.len(),
            MemberSelection::Distinct => self.sorted.len(),
            MemberSelection::Flags => self.all_flags_mask.bit_count() as usize,
        }
    }

    pub fn names(&self, selection: MemberSelection) -> impl Iterator<Item = &str> + '_ {
        self.get_members(selection).map(EnumMember::name)
    }

    pub fn values(&self, selection: MemberSelection) -> impl Iterator<Item = U> + '_ {
        self.get_members(selection).map(EnumMember::value)
    }

    /// Every member sharing `value`, primary first. Empty when undefined.
    pub fn aliases_of(&self, value: U) -> Aliases<'_, U> {
        Aliases {
            cache: self,
            cursor: self.group_head(value),
        }
    }
}

/// Iterator returned by [`MemberCache::get_members`].
#[derive(Clone)]
pub struct Members<'a, U: Underlying> {
    cache: &'a MemberCache<U>,
    selection: MemberSelection,
    next_sorted: usize,
    alias_cursor: Option<usize>,
    remaining: usize,
}

impl<'a, U: Underlying> Iterator for Members<'a, U> {
    type Item = &'a EnumMember<U>;

    fn next(&mut self) -> Option<Self::Item> {
        let cache = self.cache;
        if let Some(i) = self.alias_cursor {
            self.alias_cursor = cache.links[i].alias_next;
            self.remaining -= 1;
            return Some(&cache.members[i]);
        }
        while let Some(&head) = cache.sorted.get(self.next_sorted) {
            self.next_sorted += 1;
            let member = &cache.members[head];
            match self.selection {
                MemberSelection::All => self.alias_cursor = cache.links[head].alias_next,
                MemberSelection::Distinct => {}
                MemberSelection::Flags if member.value().is_single_bit() => {}
                MemberSelection::Flags => continue,
            }
            self.remaining -= 1;
            return Some(member);
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<U: Underlying> ExactSizeIterator for Members<'_, U> {}
impl<U: Underlying> FusedIterator for Members<'_, U> {}

/// Iterator returned by [`MemberCache::aliases_of`].
#[derive(Clone)]
pub struct Aliases<'a, U: Underlying> {
    cache: &'a MemberCache<U>,
    cursor: Option<usize>,
}

impl<'a, U: Underlying> Iterator for Aliases<'a, U> {
    type Item = &'a EnumMember<U>;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.cursor?;
        self.cursor = self.cache.links[i].alias_next;
        Some(&self.cache.members[i])
    }
}

impl<U: Underlying> FusedIterator for Aliases<'_, U> {}
