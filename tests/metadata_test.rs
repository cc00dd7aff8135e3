use enum_cache::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, EnumMembers)]
#[repr(u16)]
enum Ability {
    // Untyped literals: integers are i32, floats f64
    #[enum_cache(meta(damage = 50, cost = 10, range = 5.0))]
    BasicAttack = 1,

    #[enum_cache(meta(damage = 100, cooldown = 2.5f32, charges = 3u8))]
    HeavyAttack = 2,

    #[enum_cache(description = "get moving", meta(speed = -2, label = "dash"))]
    Dash = 3,

    Idle = 4,
}

#[test]
fn test_typed_metadata() {
    let cache = Ability::member_cache().unwrap();

    let basic = cache.get_member_by_value(1).unwrap();
    assert_eq!(basic.get_meta::<i32>("damage"), Some(50));
    assert_eq!(basic.get_meta::<i32>("cost"), Some(10));
    assert_eq!(basic.get_meta::<f64>("range"), Some(5.0));

    let heavy = cache.get_member_by_value(2).unwrap();
    assert_eq!(heavy.get_meta::<f32>("cooldown"), Some(2.5));
    assert_eq!(heavy.get_meta::<u8>("charges"), Some(3));

    // Wrong size reads as None
    assert_eq!(heavy.get_meta::<u64>("damage"), None);
    assert_eq!(heavy.get_meta::<i32>("missing"), None);
}

#[test]
fn test_negative_and_text_metadata() {
    let cache = Ability::member_cache().unwrap();
    let dash = cache.get_member_by_name("Dash", false).unwrap();

    assert_eq!(dash.get_meta::<i32>("speed"), Some(-2));
    assert_eq!(dash.attributes().get_meta_raw("label"), Some(&b"dash"[..]));
    assert_eq!(dash.description(), Some("get moving"));
    assert_eq!(dash.attributes().meta_keys().collect::<Vec<_>>(), vec!["speed", "label"]);
}

#[test]
fn test_member_without_metadata() {
    let cache = Ability::member_cache().unwrap();
    let idle = cache.get_member_by_value(4).unwrap();
    assert!(idle.attributes().is_empty());
    assert_eq!(idle.description(), None);
    assert_eq!(cache.to_string(4, &[EnumFormat::Description]).unwrap(), None);
}

#[test]
fn test_description_format_and_parse() {
    let cache = Ability::member_cache().unwrap();
    assert_eq!(
        cache
            .to_string(3, &[EnumFormat::Description, EnumFormat::Name])
            .unwrap()
            .as_deref(),
        Some("get moving")
    );
    assert_eq!(
        cache
            .to_string(4, &[EnumFormat::Description, EnumFormat::Name])
            .unwrap()
            .as_deref(),
        Some("Idle")
    );
    assert_eq!(cache.parse("GET MOVING", true, &[EnumFormat::Description]), Ok(3));
}

/// Settings a host application would load from its config file.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct ParseConfig {
    kind: UnderlyingKind,
    selection: MemberSelection,
    display: Vec<EnumFormat>,
    parse: ParseOptions,
}

#[test]
fn test_serde_config_round_trip() {
    let json = r#"{
        "kind": "i16",
        "selection": "distinct",
        "display": ["description", "name", {"custom": 2}],
        "parse": { "ignore_case": true, "delimiter": "|" }
    }"#;

    let config: ParseConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.kind, UnderlyingKind::I16);
    assert_eq!(config.selection, MemberSelection::Distinct);
    assert_eq!(
        config.display,
        vec![EnumFormat::Description, EnumFormat::Name, EnumFormat::Custom(2)]
    );
    assert!(config.parse.ignore_case);
    assert_eq!(config.parse.delimiter, "|");
    // Omitted fields take their defaults
    assert_eq!(config.parse.formats, vec![EnumFormat::Name]);

    let back: ParseConfig = serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_serde_rejects_unknown_kind() {
    let err = serde_json::from_str::<UnderlyingKind>(r#""u128""#);
    assert!(err.is_err());
}
