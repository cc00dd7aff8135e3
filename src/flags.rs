//! Flag-enum helpers.
//!
//! Bitwise queries relative to a cache's single-bit members. They are
//! defined for every cache; on a non-flags enum the mask is simply whatever
//! single-bit values happen to be declared.

use crate::cache::MemberCache;
use crate::kind::Underlying;
use crate::member::EnumMember;

impl<U: Underlying> MemberCache<U> {
    /// Every declared flag OR-ed together.
    #[inline]
    pub fn all_flags(&self) -> U {
        self.all_flags_mask
    }

    /// `true` when every set bit of `value` is a declared flag.
    #[inline]
    pub fn is_valid_flag_combination(&self, value: U) -> bool {
        (value & !self.all_flags_mask) == U::ZERO
    }

    /// The flag members whose bit is set in `value`, ascending.
    ///
    /// Bits with no declared member are skipped.
    pub fn flag_members(&self, value: U) -> impl Iterator<Item = &EnumMember<U>> + '_ {
        self.get_members(crate::MemberSelection::Flags)
            .filter(move |m| (value & m.value()) != U::ZERO)
    }

    /// Number of declared flags set in `value`.
    #[inline]
    pub fn flag_count(&self, value: U) -> u32 {
        (value & self.all_flags_mask).bit_count()
    }

    /// `true` if `value` has any declared flag set.
    #[inline]
    pub fn has_any_flags(&self, value: U) -> bool {
        (value & self.all_flags_mask) != U::ZERO
    }

    /// `true` if `value` shares any bit with `other`.
    #[inline]
    pub fn has_any_flags_of(&self, value: U, other: U) -> bool {
        (value & other) != U::ZERO
    }

    /// `true` if `value` has every declared flag set.
    #[inline]
    pub fn has_all_flags(&self, value: U) -> bool {
        (value & self.all_flags_mask) == self.all_flags_mask
    }

    /// `true` if every bit of `other` is set in `value`.
    #[inline]
    pub fn has_all_flags_of(&self, value: U, other: U) -> bool {
        (value & other) == other
    }

    /// Flip every declared flag in `value`; undeclared bits are kept.
    #[inline]
    pub fn toggle_flags(&self, value: U) -> U {
        value ^ self.all_flags_mask
    }

    #[inline]
    pub fn combine_flags(&self, value: U, other: U) -> U {
        value | other
    }

    #[inline]
    pub fn common_flags(&self, value: U, other: U) -> U {
        value & other
    }

    #[inline]
    pub fn remove_flags(&self, value: U, other: U) -> U {
        value & !other
    }
}

#[cfg(test)]
mod tests {
    use crate::{MemberCache, MemberRecord};

    fn perms() -> MemberCache<u8> {
        MemberCache::build(
            [
                MemberRecord::new("None", 0u8),
                MemberRecord::new("Read", 1),
                MemberRecord::new("Write", 2),
                MemberRecord::new("ReadWrite", 3),
                MemberRecord::new("Execute", 4),
            ],
            true,
            None,
        )
    }

    #[test]
    fn all_flags_and_combinations() {
        let cache = perms();
        assert_eq!(cache.all_flags(), 7);
        assert!(cache.is_valid_flag_combination(5));
        assert!(cache.is_valid_flag_combination(0));
        assert!(!cache.is_valid_flag_combination(9));
    }

    #[test]
    fn flag_members_decompose_value() {
        let cache = perms();
        let names: Vec<&str> = cache.flag_members(5).map(|m| m.name()).collect();
        assert_eq!(names, vec!["Read", "Execute"]);
        // Undeclared bit 8 is ignored.
        assert_eq!(cache.flag_members(8 | 2).count(), 1);
        assert_eq!(cache.flag_count(0xFF), 3);
    }

    #[test]
    fn has_flags() {
        let cache = perms();
        assert!(cache.has_any_flags(4));
        assert!(!cache.has_any_flags(8));
        assert!(cache.has_all_flags(7));
        assert!(!cache.has_all_flags(3));
        assert!(cache.has_all_flags_of(7, 5));
        assert!(!cache.has_all_flags_of(3, 5));
        assert!(cache.has_any_flags_of(3, 6));
    }

    #[test]
    fn flag_arithmetic() {
        let cache = perms();
        assert_eq!(cache.toggle_flags(1), 6);
        assert_eq!(cache.toggle_flags(8), 15);
        assert_eq!(cache.combine_flags(1, 4), 5);
        assert_eq!(cache.common_flags(3, 6), 2);
        assert_eq!(cache.remove_flags(7, 2), 5);
    }
}
