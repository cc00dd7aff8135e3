//! Custom formats and the cache directory.
//!
//! This example shows how to:
//! - Build a cache from explicit records without the derive macro
//! - Register custom formats and use them for formatting and parsing
//! - Share caches through a `CacheDirectory` keyed by your own ids

use std::sync::Arc;

use enum_cache::*;

fn status_records() -> Vec<MemberRecord<u16>> {
    vec![
        MemberRecord::new("Ok", 200).with_description("request succeeded"),
        MemberRecord::new("NotFound", 404).with_meta("retry", &0u8),
        MemberRecord::new("Unavailable", 503).with_meta("retry", &1u8),
        MemberRecord::new("ServiceUnavailable", 503).primary(),
    ]
}

fn main() {
    let directory: CacheDirectory<&'static str> = CacheDirectory::with_capacity(4);
    let cache = directory
        .get_or_build("http-status", || Ok(MemberCache::build(status_records(), false, None)))
        .expect("build status cache");

    let mut formats = CustomFormats::new();
    let snake = formats
        .register(|m: &EnumMember<u16>| {
            let mut out = String::new();
            for (i, c) in m.name().chars().enumerate() {
                if c.is_uppercase() && i > 0 {
                    out.push('_');
                }
                out.extend(c.to_lowercase());
            }
            Some(out)
        })
        .expect("register snake_case format");
    let retry = formats
        .register(|m: &EnumMember<u16>| {
            m.get_meta::<u8>("retry")
                .map(|r| format!("{} (retry={r})", m.name()))
        })
        .expect("register retry format");

    println!("=== Formatting ===");
    for value in [200u16, 404, 503, 418] {
        let text = cache
            .to_string_with(value, &[retry, snake, EnumFormat::UnderlyingValue], &formats)
            .expect("registered formats");
        println!("  {value}: {text:?}");
    }

    println!("\n=== Parsing ===");
    for text in ["service_unavailable", "NOT_FOUND", "Unavailable", "teapot"] {
        let parsed = cache.parse_with(text, true, &[snake, EnumFormat::Name], &formats);
        println!("  {text:<20} -> {parsed:?}");
    }
    let unknown = cache.to_string(200, &[EnumFormat::Custom(7)]);
    println!("  unknown selector    -> {unknown:?}");

    println!("\n=== Directory ===");
    let again = directory
        .get_or_build("http-status", || Ok(MemberCache::build(Vec::new(), false, None)))
        .expect("cached");
    println!("  shared instance: {}", Arc::ptr_eq(&cache, &again));
    println!("  {directory:?}");
}
