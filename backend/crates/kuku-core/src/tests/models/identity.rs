use crate::{Identity, Role, SessionUser, UserMetadata, UserProfile};

use uuid::Uuid;

fn profile() -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        email: "wanjiku@example.com".into(),
        role: Role::Farmer,
        full_name: None,
        first_name: None,
        last_name: None,
        phone: None,
        avatar_url: None,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn given_full_name_when_display_name_then_uses_it() {
    let profile = UserProfile {
        full_name: Some("Wanjiku Kamau".into()),
        ..profile()
    };
    assert_eq!(profile.display_name(), "Wanjiku Kamau");
}

#[test]
fn given_first_and_last_name_when_display_name_then_joins_them() {
    let profile = UserProfile {
        first_name: Some("Wanjiku".into()),
        last_name: Some("Kamau".into()),
        ..profile()
    };
    assert_eq!(profile.display_name(), "Wanjiku Kamau");
}

#[test]
fn given_no_names_when_display_name_then_email_local_part() {
    assert_eq!(profile().display_name(), "wanjiku");
}

#[test]
fn given_lowercase_role_row_when_deserialize_then_identity_role_normalized() {
    let json = r#"{
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "email": "admin@example.com",
        "role": "admin",
        "full_name": "Site Admin"
    }"#;

    let profile: UserProfile = serde_json::from_str(json).unwrap();
    let identity = Identity::from(&profile);

    assert_eq!(identity.role, Role::Admin);
    assert_eq!(identity.display_name, "Site Admin");
}

#[test]
fn given_session_user_without_metadata_when_default_profile_then_farmer_named_after_email() {
    let user = SessionUser {
        id: Uuid::new_v4(),
        email: Some("otieno@example.com".into()),
        user_metadata: UserMetadata::default(),
    };

    let new_profile = user.default_profile();

    assert_eq!(new_profile.role, Role::Farmer);
    assert_eq!(new_profile.full_name, "otieno");
    assert_eq!(new_profile.id, user.id);
}

#[test]
fn given_session_user_with_split_name_when_default_profile_then_joined() {
    let user = SessionUser {
        id: Uuid::new_v4(),
        email: Some("otieno@example.com".into()),
        user_metadata: UserMetadata {
            first_name: Some("Otieno".into()),
            last_name: Some("Odhiambo".into()),
            phone: Some("+254700000000".into()),
            ..UserMetadata::default()
        },
    };

    let new_profile = user.default_profile();

    assert_eq!(new_profile.full_name, "Otieno Odhiambo");
    assert_eq!(new_profile.phone.as_deref(), Some("+254700000000"));
}
