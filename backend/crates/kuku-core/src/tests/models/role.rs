use crate::Role;

use std::str::FromStr;

use googletest::assert_that;
use googletest::prelude::{anything, eq, err};
use proptest::prelude::*;

#[test]
fn given_mixed_case_admin_when_normalize_then_admin() {
    for raw in ["admin", "Admin", "ADMIN", " aDmIn "] {
        assert_that!(Role::normalize(raw), eq(Role::Admin));
    }
}

#[test]
fn given_unknown_role_when_normalize_then_defaults_to_farmer() {
    assert_that!(Role::normalize("superuser"), eq(Role::Farmer));
    assert_that!(Role::normalize(""), eq(Role::Farmer));
}

#[test]
fn given_unknown_role_when_from_str_then_error() {
    assert_that!(Role::from_str("superuser"), err(anything()));
}

#[test]
fn given_lowercase_json_role_when_deserialize_then_normalized() {
    let role: Role = serde_json::from_str(r#""farmer""#).unwrap();
    assert_eq!(role, Role::Farmer);

    let role: Role = serde_json::from_str(r#""Admin""#).unwrap();
    assert_eq!(role, Role::Admin);
}

#[test]
fn given_null_json_role_when_deserialize_then_default() {
    let role: Role = serde_json::from_str("null").unwrap();
    assert_eq!(role, Role::default());
}

#[test]
fn given_role_when_serialize_then_uppercase() {
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""ADMIN""#);
    assert_eq!(serde_json::to_string(&Role::Farmer).unwrap(), r#""FARMER""#);
}

proptest! {
    #[test]
    fn given_any_casing_of_known_role_when_normalize_then_uppercase_value(
        raw in prop_oneof![Just("admin"), Just("farmer")],
        mask in proptest::collection::vec(any::<bool>(), 6),
    ) {
        let cased: String = raw
            .chars()
            .zip(mask.iter().cycle())
            .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
            .collect();

        let normalized = Role::normalize(&cased);
        prop_assert_eq!(normalized.as_str(), raw.to_uppercase());
    }

    #[test]
    fn given_arbitrary_string_when_normalize_then_only_known_values(raw in ".{0,20}") {
        let value = Role::normalize(&raw).as_str();
        prop_assert!(value == "ADMIN" || value == "FARMER");
    }
}
