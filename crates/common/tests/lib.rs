// crates/common/tests/lib.rs
use assetreg_common::{candidate, is_safe_url, slugify, AssetVariant};

#[test]
fn test_asset_variant_serialization() {
    let json = serde_json::to_string(&AssetVariant::Valued).unwrap();
    assert_eq!(json, "\"valued\"");

    let parsed: AssetVariant = serde_json::from_str("\"serial\"").unwrap();
    assert_eq!(parsed, AssetVariant::Serial);
    assert_eq!(AssetVariant::default(), AssetVariant::Serial);

    assert!(serde_json::from_str::<AssetVariant>("\"price\"").is_err());
}

#[test]
fn test_variant_decides_required_field() {
    assert!(AssetVariant::Serial.requires_serial_number());
    assert!(!AssetVariant::Serial.requires_value());
    assert!(AssetVariant::Valued.requires_value());
    assert!(!AssetVariant::Valued.requires_serial_number());
}

#[test]
fn test_identical_names_yield_distinct_candidates() {
    let base = slugify("Pallet Jack");
    let taken: Vec<String> = (0..5).map(|n| candidate(&base, n)).collect();

    assert_eq!(taken[0], "pallet-jack");
    assert_eq!(taken[1], "pallet-jack-1");
    for (i, a) in taken.iter().enumerate() {
        for b in &taken[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_documented_redirect_examples() {
    assert!(!is_safe_url("example.com", "http://evil.com/x"));
    assert!(is_safe_url("example.com", "/profile"));
    assert!(!is_safe_url("example.com", "//evil.com/x"));
}
