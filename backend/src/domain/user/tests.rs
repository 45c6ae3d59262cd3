//! Tests for the domain user model.

use super::*;
use crate::domain::ErrorCode;
use rstest::{fixture, rstest};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn complete_form() -> RegistrationForm {
    RegistrationForm {
        email: Some("Ada@Example.org".to_owned()),
        username: Some("ada.l".to_owned()),
        first_name: Some("Ada".to_owned()),
        last_name: Some("Lovelace".to_owned()),
        password: Some(Zeroizing::new("analytical-engine".to_owned())),
    }
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
fn user_id_rejects_bad_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
}

#[rstest]
fn user_id_round_trips_through_serde() {
    let id = UserId::new(VALID_ID).expect("valid id");
    let value = serde_json::to_value(&id).expect("serialise");
    assert_eq!(value, json!(VALID_ID));
    let decoded: UserId = serde_json::from_value(value).expect("deserialise");
    assert_eq!(decoded, id);
}

#[rstest]
#[case("ada@example.org", true)]
#[case("  Ada@Example.ORG ", true)]
#[case("ada.example.org", false)]
#[case("ada@localhost", false)]
#[case("", false)]
fn email_shape(#[case] raw: &str, #[case] accepted: bool) {
    assert_eq!(Email::new(raw).is_ok(), accepted);
}

#[rstest]
fn email_is_normalised_to_lowercase() {
    let email = Email::new("  Ada@Example.ORG ").expect("valid email");
    assert_eq!(email.as_ref(), "ada@example.org");
}

#[rstest]
fn email_length_is_bounded() {
    let local = "a".repeat(EMAIL_MAX);
    let err = Email::new(format!("{local}@example.org")).expect_err("too long");
    assert_eq!(err, UserValidationError::EmailTooLong { max: EMAIL_MAX });
}

#[rstest]
#[case("ada_l", true)]
#[case("ada.l+cook@home", true)]
#[case("ada l", false)]
#[case("ada$", false)]
fn username_characters(#[case] raw: &str, #[case] accepted: bool) {
    assert_eq!(Username::new(raw).is_ok(), accepted);
}

#[rstest]
fn person_name_is_trimmed_and_bounded() {
    assert_eq!(
        PersonName::new("  Ada ").expect("valid name").as_ref(),
        "Ada"
    );
    assert_eq!(
        PersonName::new("a".repeat(PERSON_NAME_MAX + 1)).expect_err("too long"),
        UserValidationError::NameTooLong {
            max: PERSON_NAME_MAX
        }
    );
    assert_eq!(
        PersonName::new("   ").expect_err("blank"),
        UserValidationError::EmptyName
    );
}

#[rstest]
fn registration_accepts_complete_form(complete_form: RegistrationForm) {
    let registration = Registration::validate(complete_form).expect("valid registration");
    assert_eq!(registration.email.as_ref(), "ada@example.org");
    assert_eq!(registration.username.as_ref(), "ada.l");
    assert_eq!(registration.password(), "analytical-engine");
}

#[rstest]
fn registration_reports_every_violation(mut complete_form: RegistrationForm) {
    complete_form.email = Some("nope".to_owned());
    complete_form.last_name = None;
    complete_form.password = Some(Zeroizing::new("short".to_owned()));

    let err = Registration::validate(complete_form).expect_err("invalid registration");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let fields: Vec<_> = err
        .details()
        .and_then(|details| details.get("violations"))
        .and_then(serde_json::Value::as_array)
        .expect("violations listed")
        .iter()
        .map(|violation| violation["field"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(fields, ["email", "lastName", "password"]);
}

#[rstest]
#[case("1234567", Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN }))]
#[case("12345678", Ok(()))]
fn password_policy(#[case] password: &str, #[case] expected: Result<(), UserValidationError>) {
    assert_eq!(check_password(password), expected);
}
