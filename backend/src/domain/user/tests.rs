//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn leader() -> User {
    let name = DisplayName::new("Ada Lovelace").expect("fixture name");
    User::new(UserId::new(VALID_ID).expect("fixture id"), name, Role::Leader)
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
#[case("   ".to_owned(), UserValidationError::EmptyDisplayName)]
#[case("ab".to_owned(), UserValidationError::DisplayNameTooShort { min: DISPLAY_NAME_MIN })]
#[case(
    "a".repeat(DISPLAY_NAME_MAX + 1),
    UserValidationError::DisplayNameTooLong { max: DISPLAY_NAME_MAX }
)]
#[case("bad$char".to_owned(), UserValidationError::DisplayNameInvalidCharacters)]
fn display_name_rejects_invalid_input(
    #[case] raw: String,
    #[case] expected: UserValidationError,
) {
    assert_eq!(DisplayName::new(raw), Err(expected));
}

#[rstest]
#[case("Zoë Müller")]
#[case("Jean-Luc")]
#[case("o'Brien_2")]
fn display_name_accepts_club_names(#[case] raw: &str) {
    let name = DisplayName::new(raw).expect("valid display name");
    assert_eq!(name.as_ref(), raw);
}

#[rstest]
fn new_users_are_active(leader: User) {
    assert!(leader.is_active());
    assert_eq!(leader.role(), Role::Leader);
}

#[rstest]
fn active_admin_requires_both_role_and_flag(leader: User) {
    let admin = leader.clone().with_role(Role::Admin);
    assert!(admin.is_active_admin());
    assert!(!admin.with_active(false).is_active_admin());
    assert!(!leader.is_active_admin());
}

#[rstest]
fn serialises_in_camel_case(leader: User) {
    let value = serde_json::to_value(&leader).expect("serialises");
    assert_eq!(
        value,
        json!({
            "id": VALID_ID,
            "displayName": "Ada Lovelace",
            "role": "leader",
            "isActive": true,
        })
    );
}

#[rstest]
fn deserialising_rejects_invalid_display_name() {
    let payload = json!({
        "id": VALID_ID,
        "displayName": "x",
        "role": "member",
        "isActive": true,
    });
    assert!(serde_json::from_value::<User>(payload).is_err());
}
