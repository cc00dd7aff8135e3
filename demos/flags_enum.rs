//! Flags enum demonstration.
//!
//! This example shows how to:
//! - Mark an enum as a flags enum with `#[enum_cache(flags)]`
//! - Validate, format and parse flag combinations
//! - Use the bitwise flag helpers

use enum_cache::*;

#[derive(Clone, Copy, Debug, PartialEq, EnumMembers)]
#[repr(u8)]
#[enum_cache(flags)]
enum Permission {
    None = 0,
    Read = 1,
    Write = 2,
    #[enum_cache(description = "read and write")]
    ReadWrite = 3,
    Execute = 4,
}

fn main() {
    let cache = Permission::member_cache().expect("cache for Permission");

    println!("=== Flags ===");
    for member in cache.get_members(MemberSelection::Flags) {
        println!("  {:<8} = {:#04x}", member.name(), member.value());
    }
    println!("  all flags: {:#04x}", cache.all_flags());

    println!("\n=== Validity ===");
    for value in [0u8, 5, 7, 8, 12] {
        println!("  {value:>2}: valid={} defined={}", cache.is_valid(value), cache.is_defined(value));
    }

    println!("\n=== Formatting ===");
    for value in [3u8, 5, 7, 9] {
        println!("  {value}: {}", cache.as_string(value));
    }

    println!("\n=== Parsing ===");
    for text in ["Read, Execute", "write|execute", "Read, Delete", "0x06"] {
        let options = ParseOptions {
            ignore_case: true,
            delimiter: if text.contains('|') { "|".into() } else { ",".into() },
            ..ParseOptions::default()
        };
        println!("  {text:<14} -> {:?}", cache.parse_with_options(text, &options, &NoCustomFormats));
    }

    println!("\n=== Helpers ===");
    let rw = cache.combine_flags(1, 2);
    println!("  Read | Write          = {}", cache.as_string(rw));
    println!("  toggle(Read)          = {}", cache.as_string(cache.toggle_flags(1)));
    println!("  remove(7, Write)      = {}", cache.as_string(cache.remove_flags(7, 2)));
    println!("  has_all_flags_of(7,5) = {}", cache.has_all_flags_of(7, 5));
    println!("  flag_count(7)         = {}", cache.flag_count(7));
}
