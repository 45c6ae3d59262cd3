//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::validation::{FieldViolation, Violations};
use super::{Error, ImageRef};

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
    EmptyName,
    NameTooLong { max: usize },
    PasswordTooShort { min: usize },
    PasswordTooLong { max: usize },
}

impl UserValidationError {
    /// Stable violation code used in error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::EmptyEmail | Self::EmptyUsername | Self::EmptyName => "blank",
            Self::InvalidId | Self::InvalidEmail | Self::UsernameInvalidCharacters => "invalid",
            Self::EmailTooLong { .. }
            | Self::UsernameTooLong { .. }
            | Self::NameTooLong { .. }
            | Self::PasswordTooLong { .. } => "too_long",
            Self::PasswordTooShort { .. } => "too_short",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, digits and the characters @ . + - _",
            ),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 150;
/// Maximum allowed length for first and last names.
pub const PERSON_NAME_MAX: usize = 150;
/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length accepted at registration.
pub const PASSWORD_MAX: usize = 128;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[\w.@+-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Login email, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into().trim().to_lowercase();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

/// Public handle shown next to recipes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate a username.
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_regex().is_match(&username) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(username))
    }
}

/// First or last name of a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate a first or last name; surrounding whitespace is trimmed.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > PERSON_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: PERSON_NAME_MAX,
            });
        }
        Ok(Self(name))
    }
}

macro_rules! string_newtype_conversions {
    ($($name:ident),* $(,)?) => {
        $(
            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl TryFrom<String> for $name {
                type Error = UserValidationError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }
        )*
    };
}

string_newtype_conversions!(Email, Username, PersonName);

/// Application user.
///
/// ## Invariants
/// - every field has passed its own validation;
/// - `email` is unique across users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub avatar: Option<ImageRef>,
    pub is_staff: bool,
}

/// A user as seen by another (possibly anonymous) user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    /// Whether the viewer follows this user. Always `false` for anonymous
    /// viewers and for the viewer's own profile.
    pub is_subscribed: bool,
}

/// Raw registration input as received from a client.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: Email,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate every field of `form`, reporting all violations together.
    pub fn validate(form: RegistrationForm) -> Result<Self, Error> {
        let mut violations = Violations::new();
        let email = violations.check(field(form.email, "email", Email::new));
        let username = violations.check(field(form.username, "username", Username::new));
        let first_name = violations.check(field(form.first_name, "firstName", PersonName::new));
        let last_name = violations.check(field(form.last_name, "lastName", PersonName::new));
        let password = violations.check(match form.password {
            None => Err(required("password")),
            Some(password) => check_password(&password)
                .map(|()| password)
                .map_err(|err| violation("password", &err)),
        });

        violations.finish(|| {
            Some(Self {
                email: email?,
                username: username?,
                first_name: first_name?,
                last_name: last_name?,
                password: password?,
            })
        })
    }

    /// Plain-text password to be hashed before storage.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Enforce the password length policy.
pub fn check_password(password: &str) -> Result<(), UserValidationError> {
    let length = password.chars().count();
    if length < PASSWORD_MIN {
        return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    if length > PASSWORD_MAX {
        return Err(UserValidationError::PasswordTooLong { max: PASSWORD_MAX });
    }
    Ok(())
}

fn field<T>(
    value: Option<String>,
    name: &'static str,
    parse: impl FnOnce(String) -> Result<T, UserValidationError>,
) -> Result<T, FieldViolation> {
    let value = value.ok_or_else(|| required(name))?;
    parse(value).map_err(|err| violation(name, &err))
}

fn required(name: &'static str) -> FieldViolation {
    FieldViolation::invalid(name, "required", format!("{name} is required"))
}

fn violation(name: &'static str, err: &UserValidationError) -> FieldViolation {
    FieldViolation::invalid(name, err.code(), err.to_string())
}

#[cfg(test)]
mod tests;
