//! Cache builder: turns declaration-ordered member records into a
//! [`MemberCache`].
//!
//! Single pass over the records:
//!
//! 1. Walk the value's bucket chain for an existing group of equal value.
//! 2. Existing group: a primacy-marked record splices itself in front of the
//!    alias chain and takes over the group's bucket and sorted-table slots;
//!    any other record is appended to the end of the chain.
//! 3. New value: new chain head, ordered insertion into the sorted table,
//!    distinct count and flag mask updated.
//!
//! The sorted table is positioned by scanning backward from its end, so the
//! common case of ascending declarations costs O(1) per record.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{EnumValidator, Link, MemberCache};
use crate::hash::{bucket_count_for, bucket_index};
use crate::kind::Underlying;
use crate::member::{EnumMember, MemberRecord};

/// Collects member records and builds a [`MemberCache`].
///
/// ```
/// use enum_cache::{CacheBuilder, MemberRecord};
///
/// let cache = CacheBuilder::new()
///     .flags(true)
///     .member(MemberRecord::new("Red", 1u8))
///     .member(MemberRecord::new("Green", 2u8))
///     .member(MemberRecord::new("Blue", 4u8))
///     .build();
///
/// assert!(cache.is_valid(7));
/// assert!(!cache.is_valid(8));
/// ```
pub struct CacheBuilder<U: Underlying> {
    records: Vec<MemberRecord<U>>,
    is_flags: bool,
    validator: Option<Arc<dyn EnumValidator<U>>>,
}

impl<U: Underlying> Default for CacheBuilder<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Underlying> CacheBuilder<U> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            is_flags: false,
            validator: None,
        }
    }

    /// Declare the type as a flags enum.
    pub fn flags(mut self, is_flags: bool) -> Self {
        self.is_flags = is_flags;
        self
    }

    /// Install a custom validator; it replaces the built-in validity check.
    pub fn validator(mut self, validator: Arc<dyn EnumValidator<U>>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Append one record (declaration order matters for primacy).
    pub fn member(mut self, record: MemberRecord<U>) -> Self {
        self.records.push(record);
        self
    }

    pub fn members(mut self, records: impl IntoIterator<Item = MemberRecord<U>>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn build(self) -> MemberCache<U> {
        let Self {
            records,
            is_flags,
            validator,
        } = self;

        let bucket_count = bucket_count_for(records.len());
        let mut buckets: Box<[Option<usize>]> = vec![None; bucket_count].into_boxed_slice();
        let mut members: Vec<EnumMember<U>> = Vec::with_capacity(records.len());
        let mut links: Vec<Link> = Vec::with_capacity(records.len());
        let mut sorted: Vec<usize> = Vec::new();
        let mut all_flags_mask = U::ZERO;

        for record in records {
            let idx = members.len();
            let value = record.value();
            let marked = record.is_primary();
            members.push(EnumMember::from_record(record));
            links.push(Link::default());

            let slot = bucket_index(value.bucket_hash(), bucket_count);
            match find_group(&members, &links, buckets[slot], value) {
                Some((prev, head)) if marked => {
                    // Take over the head's position in the bucket chain.
                    links[idx].alias_next = Some(head);
                    links[idx].bucket_next = links[head].bucket_next.take();
                    match prev {
                        Some(p) => links[p].bucket_next = Some(idx),
                        None => buckets[slot] = Some(idx),
                    }
                    let pos = scan_back(&sorted, &members, value);
                    debug_assert!(pos > 0 && members[sorted[pos - 1]].value() == value);
                    sorted[pos - 1] = idx;
                }
                Some((_, head)) => {
                    let mut tail = head;
                    while let Some(next) = links[tail].alias_next {
                        tail = next;
                    }
                    links[tail].alias_next = Some(idx);
                }
                None => {
                    links[idx].bucket_next = buckets[slot];
                    buckets[slot] = Some(idx);
                    let pos = scan_back(&sorted, &members, value);
                    sorted.insert(pos, idx);
                    if value.is_single_bit() {
                        all_flags_mask = all_flags_mask | value;
                    }
                }
            }
        }

        for &i in &sorted {
            members[i].set_primary(true);
        }

        let distinct_count = sorted.len();
        let is_contiguous = match (sorted.first(), sorted.last()) {
            (Some(&first), Some(&last)) => {
                let span = members[last].value().to_i128() - members[first].value().to_i128();
                span == distinct_count as i128 - 1
            }
            // Empty caches are not contiguous.
            _ => false,
        };

        let (names, folded_names) = name_indices(&members, &links, &sorted);

        tracing::debug!(
            kind = %U::KIND,
            members = members.len(),
            distinct = distinct_count,
            all_flags = %all_flags_mask,
            contiguous = is_contiguous,
            flags = is_flags,
            "built member cache"
        );

        MemberCache {
            members,
            links,
            buckets,
            sorted,
            names,
            folded_names,
            all_flags_mask,
            is_contiguous,
            is_flags,
            validator,
        }
    }
}

/// Find the group head for `value` in the chain starting at `head`.
///
/// Returns `(previous chain node, head)`.
fn find_group<U: Underlying>(
    members: &[EnumMember<U>],
    links: &[Link],
    mut cursor: Option<usize>,
    value: U,
) -> Option<(Option<usize>, usize)> {
    let mut prev = None;
    while let Some(i) = cursor {
        if members[i].value() == value {
            return Some((prev, i));
        }
        prev = Some(i);
        cursor = links[i].bucket_next;
    }
    None
}

/// Number of sorted entries whose value is `<= value`, counting from the end.
fn scan_back<U: Underlying>(sorted: &[usize], members: &[EnumMember<U>], value: U) -> usize {
    let mut pos = sorted.len();
    while pos > 0 && value < members[sorted[pos - 1]].value() {
        pos -= 1;
    }
    pos
}

/// Exact and case-folded name → value maps, filled in value-then-declaration
/// order so the first occurrence of an ambiguous name wins.
fn name_indices<U: Underlying>(
    members: &[EnumMember<U>],
    links: &[Link],
    sorted: &[usize],
) -> (HashMap<String, U>, HashMap<String, U>) {
    let mut names = HashMap::with_capacity(members.len());
    let mut folded = HashMap::with_capacity(members.len());
    for &head in sorted {
        let mut cursor = Some(head);
        while let Some(i) = cursor {
            let member = &members[i];
            names.entry(member.name().to_string()).or_insert(member.value());
            folded.entry(member.name().to_lowercase()).or_insert(member.value());
            cursor = links[i].alias_next;
        }
    }
    (names, folded)
}

impl<U: Underlying> MemberCache<U> {
    /// Build a cache from declaration-ordered records.
    pub fn build(
        records: impl IntoIterator<Item = MemberRecord<U>>,
        is_flags: bool,
        validator: Option<Arc<dyn EnumValidator<U>>>,
    ) -> Self {
        let builder = CacheBuilder::new().flags(is_flags).members(records);
        match validator {
            Some(v) => builder.validator(v).build(),
            None => builder.build(),
        }
    }
}
