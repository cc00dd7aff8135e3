//! Property-based tests for cache construction and formatting.
//!
//! Checks, over random member tables:
//! 1. Ordering: primaries come out strictly ascending whatever the
//!    declaration order.
//! 2. Round trip: every declared value resolves to a member with that value.
//! 3. Primacy: without markers the first-declared member of a value wins.
//! 4. Inverse: parsing a formatted name or hex value gives the value back.

use std::collections::{BTreeSet, HashMap};

use enum_cache::{EnumFormat, MemberCache, MemberRecord, MemberSelection};
use proptest::prelude::*;

fn records_for(values: &[i16]) -> Vec<MemberRecord<i16>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| MemberRecord::new(format!("M{i}"), v))
        .collect()
}

proptest! {
    #[test]
    fn primaries_sorted_under_any_order(values in prop::collection::vec(-50i16..50, 0..40).prop_shuffle()) {
        let cache = MemberCache::build(records_for(&values), false, None);

        let primaries: Vec<i16> = cache.values(MemberSelection::Distinct).collect();
        let expected: Vec<i16> = values.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(primaries, expected);
        prop_assert_eq!(cache.member_count(MemberSelection::All), values.len());
    }

    #[test]
    fn every_value_round_trips(values in prop::collection::vec(any::<i16>(), 1..40)) {
        let cache = MemberCache::build(records_for(&values), false, None);
        for &v in &values {
            let member = cache.get_member_by_value(v);
            prop_assert!(member.is_some());
            prop_assert_eq!(member.map(|m| m.value()), Some(v));
            prop_assert!(cache.is_defined(v));
        }
    }

    #[test]
    fn first_declared_member_is_primary(values in prop::collection::vec(0u8..8, 1..30)) {
        let records: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| MemberRecord::new(format!("M{i}"), v))
            .collect();
        let cache = MemberCache::build(records, false, None);

        let mut first: HashMap<u8, usize> = HashMap::new();
        for (i, &v) in values.iter().enumerate() {
            first.entry(v).or_insert(i);
        }
        for (v, i) in first {
            let expected = format!("M{i}");
            prop_assert_eq!(cache.get_member_by_value(v).map(|m| m.name()), Some(expected.as_str()));
        }
    }

    #[test]
    fn names_parse_back(values in prop::collection::vec(any::<u32>(), 1..30)) {
        let records: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| MemberRecord::new(format!("Member{i}"), v))
            .collect();
        let cache = MemberCache::build(records, false, None);

        for member in cache.get_members(MemberSelection::Distinct) {
            let text = cache.to_string(member.value(), &[EnumFormat::Name]).unwrap().unwrap();
            prop_assert_eq!(cache.parse(&text, false, &[EnumFormat::Name]), Ok(member.value()));
        }
    }

    #[test]
    fn hex_round_trips_for_signed(value in any::<i8>()) {
        let cache: MemberCache<i8> = MemberCache::build([], false, None);
        let text = cache.to_string(value, &[EnumFormat::HexadecimalValue]).unwrap().unwrap();
        prop_assert_eq!(text.len(), 4);
        prop_assert_eq!(cache.parse(&text, false, &[]), Ok(value));
    }

    #[test]
    fn flags_validity_matches_mask(bits in prop::collection::vec(0u32..16, 0..8), value in any::<u16>()) {
        let records: Vec<_> = bits
            .iter()
            .map(|&b| MemberRecord::new(format!("F{b}"), 1u16 << b))
            .collect();
        let cache = MemberCache::build(records, true, None);
        let mask = bits.iter().fold(0u16, |acc, &b| acc | (1 << b));

        prop_assert_eq!(cache.all_flags(), mask);
        prop_assert_eq!(cache.is_valid(value), value & !mask == 0);
    }
}
