//! Member records: the explicit (name, value, attributes) input the cache is
//! built from, and the built member the cache hands back.

use std::borrow::Cow;

use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::kind::Underlying;

/// One attribute attached to a member declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    /// Primacy marker: this member is the canonical name for its value.
    Primary,
    /// Human-readable description, used by [`crate::EnumFormat::Description`].
    Description(Cow<'static, str>),
    /// Typed metadata stored as raw bytes.
    Meta {
        key: Cow<'static, str>,
        bytes: Vec<u8>,
    },
}

/// Ordered attribute set.
///
/// Insertion order is preserved. `Primary` appears at most once, a second
/// `Description` replaces the first, and `Meta` entries are unique per key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attrs: Vec<Attribute>,
}

impl AttributeSet {
    pub const fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Insert an attribute, replacing a conflicting one in place.
    ///
    /// Returns the replaced attribute if any.
    pub fn insert(&mut self, attr: Attribute) -> Option<Attribute> {
        let existing = self.attrs.iter().position(|a| match (a, &attr) {
            (Attribute::Primary, Attribute::Primary) => true,
            (Attribute::Description(_), Attribute::Description(_)) => true,
            (Attribute::Meta { key: a, .. }, Attribute::Meta { key: b, .. }) => a == b,
            _ => false,
        });
        match existing {
            Some(i) => Some(std::mem::replace(&mut self.attrs[i], attr)),
            None => {
                self.attrs.push(attr);
                None
            }
        }
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.attrs.iter().any(|a| matches!(a, Attribute::Primary))
    }

    pub fn description(&self) -> Option<&str> {
        self.attrs.iter().find_map(|a| match a {
            Attribute::Description(text) => Some(text.as_ref()),
            _ => None,
        })
    }

    /// Store typed metadata under `key`.
    ///
    /// The type must implement `zerocopy::IntoBytes + Immutable`.
    /// Returns the previous raw bytes if any.
    pub fn set_meta<T: IntoBytes + Immutable>(
        &mut self,
        key: impl Into<Cow<'static, str>>,
        value: &T,
    ) -> Option<Vec<u8>> {
        self.set_meta_raw(key, value.as_bytes().to_vec())
    }

    /// Store raw metadata bytes under `key`.
    pub fn set_meta_raw(&mut self, key: impl Into<Cow<'static, str>>, bytes: Vec<u8>) -> Option<Vec<u8>> {
        match self.insert(Attribute::Meta { key: key.into(), bytes }) {
            Some(Attribute::Meta { bytes, .. }) => Some(bytes),
            _ => None,
        }
    }

    /// Read typed metadata.
    ///
    /// Returns `None` if the key doesn't exist or the byte length doesn't
    /// match `T`. The value is copied out, so buffer alignment doesn't matter.
    pub fn get_meta<T: FromBytes>(&self, key: &str) -> Option<T> {
        T::read_from_bytes(self.get_meta_raw(key)?).ok()
    }

    pub fn get_meta_raw(&self, key: &str) -> Option<&[u8]> {
        self.attrs.iter().find_map(|a| match a {
            Attribute::Meta { key: k, bytes } if k == key => Some(bytes.as_slice()),
            _ => None,
        })
    }

    #[inline]
    pub fn has_meta(&self, key: &str) -> bool {
        self.get_meta_raw(key).is_some()
    }

    /// Metadata keys in insertion order.
    pub fn meta_keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.iter().filter_map(|a| match a {
            Attribute::Meta { key, .. } => Some(key.as_ref()),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Attribute> for AttributeSet {
    fn extend<I: IntoIterator<Item = Attribute>>(&mut self, iter: I) {
        for attr in iter {
            self.insert(attr);
        }
    }
}

/// A declared member, as supplied to the builder.
///
/// ```
/// use enum_cache::MemberRecord;
///
/// let red = MemberRecord::new("Red", 1u8).with_description("the colour of fire");
/// let crimson = MemberRecord::new("Crimson", 1u8).primary();
/// assert!(crimson.is_primary());
/// assert_eq!(red.attributes().description(), Some("the colour of fire"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRecord<U> {
    name: Cow<'static, str>,
    value: U,
    attributes: AttributeSet,
}

impl<U: Underlying> MemberRecord<U> {
    pub fn new(name: impl Into<Cow<'static, str>>, value: U) -> Self {
        Self {
            name: name.into(),
            value,
            attributes: AttributeSet::new(),
        }
    }

    /// Builder: mark as the primary member for its value.
    pub fn primary(mut self) -> Self {
        self.attributes.insert(Attribute::Primary);
        self
    }

    pub fn with_description(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        self.attributes.insert(Attribute::Description(text.into()));
        self
    }

    pub fn with_meta<T: IntoBytes + Immutable>(mut self, key: impl Into<Cow<'static, str>>, value: &T) -> Self {
        self.attributes.set_meta(key, value);
        self
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.insert(attr);
        self
    }

    pub fn with_attributes(mut self, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attrs);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> U {
        self.value
    }

    #[inline]
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.attributes.is_primary()
    }
}

/// A member inside a built cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMember<U> {
    name: Cow<'static, str>,
    value: U,
    attributes: AttributeSet,
    primary: bool,
}

impl<U: Underlying> EnumMember<U> {
    pub(crate) fn from_record(record: MemberRecord<U>) -> Self {
        Self {
            name: record.name,
            value: record.value,
            attributes: record.attributes,
            primary: false,
        }
    }

    pub(crate) fn set_primary(&mut self, primary: bool) {
        self.primary = primary;
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn value(&self) -> U {
        self.value
    }

    #[inline]
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.attributes.description()
    }

    /// `true` for the canonical member of its value.
    #[inline]
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Shorthand for `attributes().get_meta(key)`.
    #[inline]
    pub fn get_meta<T: FromBytes>(&self, key: &str) -> Option<T> {
        self.attributes.get_meta(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_marker_is_deduplicated() {
        let record = MemberRecord::new("A", 1u8).primary().primary();
        assert!(record.is_primary());
        assert_eq!(record.attributes().len(), 1);
    }

    #[test]
    fn description_replaces_previous() {
        let record = MemberRecord::new("A", 1u8)
            .with_description("first")
            .with_description("second");
        assert_eq!(record.attributes().description(), Some("second"));
        assert_eq!(record.attributes().len(), 1);
    }

    #[test]
    fn metadata_typed_set_get() {
        let mut attrs = AttributeSet::new();
        attrs.set_meta("damage", &50i32);
        attrs.set_meta("range", &100u16);

        assert_eq!(attrs.get_meta::<i32>("damage"), Some(50));
        assert_eq!(attrs.get_meta::<u16>("range"), Some(100));
        assert_eq!(attrs.get_meta::<i32>("nonexistent"), None);

        // Wrong type returns None (size mismatch)
        assert_eq!(attrs.get_meta::<u64>("damage"), None);
    }

    #[test]
    fn metadata_overwrite_returns_previous_bytes() {
        let mut attrs = AttributeSet::new();
        assert!(attrs.set_meta("damage", &50i32).is_none());
        let old = attrs.set_meta("damage", &100i32);
        assert_eq!(old, Some(50i32.to_ne_bytes().to_vec()));
        assert_eq!(attrs.get_meta::<i32>("damage"), Some(100));
    }

    #[test]
    fn metadata_keys_in_insertion_order() {
        let attrs: AttributeSet = [
            Attribute::Meta { key: "b".into(), bytes: vec![1] },
            Attribute::Primary,
            Attribute::Meta { key: "a".into(), bytes: vec![2] },
        ]
        .into_iter()
        .collect();

        assert_eq!(attrs.meta_keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(attrs.has_meta("a"));
        assert_eq!(attrs.get_meta_raw("a"), Some(&[2u8][..]));
        assert!(attrs.is_primary());
    }

    #[test]
    fn built_member_starts_non_primary() {
        let member = EnumMember::from_record(MemberRecord::new("A", 3i16).primary());
        assert!(!member.is_primary());
        assert!(member.attributes().is_primary());
        assert_eq!(member.value(), 3);
        assert_eq!(member.name(), "A");
    }
}
