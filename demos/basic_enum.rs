//! Basic enum metadata demonstration.
//!
//! This example shows how to:
//! - Derive `EnumMembers` for a plain enum
//! - Look members up by value and by name (aliases included)
//! - Format and parse through the shared cache

use enum_cache::*;

#[derive(Clone, Copy, Debug, PartialEq, EnumMembers)]
#[repr(i8)]
enum Direction {
    #[enum_cache(description = "towards the pole", alias = "Up")]
    North = 0,
    East = 1,
    South = 2,
    #[enum_cache(primary_alias = "Sunset")]
    West = 3,
}

fn main() {
    let cache = Direction::member_cache().expect("cache for Direction");

    println!("=== Members ===");
    for member in cache.get_members(MemberSelection::All) {
        let marker = if member.is_primary() { "*" } else { " " };
        println!("  {marker} {:<8} = {}", member.name(), member.value());
    }
    println!("  contiguous: {}", cache.is_contiguous());
    println!("  range: {:?}", cache.value_range());

    println!("\n=== Lookups ===");
    println!("  3      -> {:?}", Direction::West.member_name());
    println!("  \"up\"   -> {:?}", Direction::parse_member("up", true));
    println!("  \"2\"    -> {:?}", Direction::parse_member("2", false));
    println!("  \"Left\" -> {:?}", Direction::parse_member("Left", false));

    println!("\n=== Formats ===");
    let formats = [EnumFormat::Description, EnumFormat::Name];
    for value in [0i8, 1, 9] {
        let text = cache.to_string(value, &formats).expect("built-in formats");
        println!("  {value}: {text:?} / {}", cache.as_string(value));
    }
    let hex = cache.to_string(-1, &[EnumFormat::HexadecimalValue]).expect("built-in formats");
    println!("  -1 as hex: {hex:?}");
}
