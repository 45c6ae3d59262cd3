//! [`UserRepository`] over the in-memory tables.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{ImageRef, PasswordHash, User, UserId};

use super::InMemoryStore;
use super::state::UserRow;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        for row in &state.users {
            if row.user.email == user.email {
                return Err(UserPersistenceError::duplicate("email"));
            }
            if row.user.username == user.username {
                return Err(UserPersistenceError::duplicate("username"));
            }
            if row.user.id == user.id {
                return Err(UserPersistenceError::duplicate("id"));
            }
        }
        state.users.push(UserRow {
            user: user.clone(),
            password_hash: password_hash.clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().user(id).cloned())
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|row| row.user.email.as_ref() == email)
            .map(|row| StoredCredentials {
                user: row.user.clone(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|row| &row.user.id == id)
            .map(|row| row.password_hash.clone()))
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock();
        Ok(state
            .user_row_mut(id)
            .map(|row| row.password_hash = password_hash.clone())
            .is_some())
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: Option<ImageRef>,
    ) -> Result<Option<Option<ImageRef>>, UserPersistenceError> {
        let mut state = self.lock();
        Ok(state
            .user_row_mut(id)
            .map(|row| std::mem::replace(&mut row.user.avatar, avatar)))
    }

    async fn list(&self, request: PageRequest) -> Result<Page<User>, UserPersistenceError> {
        let users = self.lock().users_by_username(|_| true);
        Ok(Page::from_all(users, request))
    }
}
