//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{ImageRef, PasswordHash, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError for "user repository" {
        /// A unique column such as the email already holds this value.
        Duplicate { field: String } => "a user with this {field} already exists",
    }
}

/// A user together with their stored password hash.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `Duplicate` when the email or username
    /// is taken.
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by (normalised) email.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Fetch the password hash of a user.
    async fn password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError>;

    /// Replace the password hash; returns `false` when the user is unknown.
    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError>;

    /// Replace the avatar and return the previous one.
    ///
    /// The outer `None` means the user does not exist.
    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: Option<ImageRef>,
    ) -> Result<Option<Option<ImageRef>>, UserPersistenceError>;

    /// List users ordered by username.
    async fn list(&self, request: PageRequest) -> Result<Page<User>, UserPersistenceError>;
}
