//! Driving ports for accounts: registration, profiles, passwords, avatars.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Error, ImagePayload, ImageRef, PasswordChange, RegistrationForm, User, UserId, UserProfile,
};

/// Domain use-case port for account changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Validate and store a new user with a hashed password.
    async fn register(&self, form: RegistrationForm) -> Result<User, Error>;

    /// Replace the password after checking the current one.
    async fn set_password(&self, user: &UserId, change: PasswordChange) -> Result<(), Error>;

    /// Store a new avatar, discarding the previous file.
    async fn set_avatar(&self, user: &UserId, payload: ImagePayload) -> Result<ImageRef, Error>;

    /// Remove the avatar, discarding its file.
    async fn clear_avatar(&self, user: &UserId) -> Result<(), Error>;
}

/// Domain use-case port for reading user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// One profile as seen by `viewer`.
    async fn profile(&self, viewer: Option<UserId>, id: &UserId) -> Result<UserProfile, Error>;

    /// All users ordered by username, as seen by `viewer`.
    async fn list(
        &self,
        viewer: Option<UserId>,
        request: PageRequest,
    ) -> Result<Page<UserProfile>, Error>;
}
