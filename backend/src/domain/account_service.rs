//! Account services: registration, login, profiles, passwords and avatars.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::{debug, info};

use crate::domain::port_errors::{
    follow_error, hasher_error, image_error, log_discarded_image, user_error,
};
use crate::domain::ports::{
    AccountCommand, AccountQuery, FollowRepository, ImageStore, LoginService, PasswordHasher,
    UserRepository,
};
use crate::domain::validation::{FieldViolation, Violations};
use crate::domain::{
    Error, ImageKind, ImagePayload, ImageRef, LoginCredentials, PasswordChange, Registration,
    RegistrationForm, User, UserId, UserProfile, check_password,
};

/// Account service implementing the account driving ports and
/// [`LoginService`].
#[derive(Clone)]
pub struct AccountService<U, F> {
    users: Arc<U>,
    follows: Arc<F>,
    hasher: Arc<dyn PasswordHasher>,
    images: Arc<dyn ImageStore>,
}

impl<U, F> AccountService<U, F> {
    /// Create a new service with the given collaborators.
    pub fn new(
        users: Arc<U>,
        follows: Arc<F>,
        hasher: Arc<dyn PasswordHasher>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            users,
            follows,
            hasher,
            images,
        }
    }
}

fn user_not_found(id: &UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

impl<U, F> AccountService<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    async fn followed_by(
        &self,
        viewer: Option<&UserId>,
        users: &[User],
    ) -> Result<HashSet<UserId>, Error> {
        let Some(viewer) = viewer else {
            return Ok(HashSet::new());
        };
        let others: Vec<UserId> = users
            .iter()
            .map(|user| user.id.clone())
            .filter(|id| id != viewer)
            .collect();
        if others.is_empty() {
            return Ok(HashSet::new());
        }
        Ok(self
            .follows
            .followed_among(viewer, &others)
            .await
            .map_err(follow_error)?
            .into_iter()
            .collect())
    }

    async fn swap_avatar(&self, user: &UserId, avatar: Option<ImageRef>) -> Result<(), Error> {
        match self.users.set_avatar(user, avatar.clone()).await {
            Ok(Some(previous)) => {
                if let Some(old) = previous {
                    log_discarded_image(self.images.remove(&old).await);
                }
                Ok(())
            }
            outcome => {
                if let Some(new) = avatar {
                    log_discarded_image(self.images.remove(&new).await);
                }
                outcome.map_err(user_error)?;
                Err(user_not_found(user))
            }
        }
    }
}

#[async_trait]
impl<U, F> AccountCommand for AccountService<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    async fn register(&self, form: RegistrationForm) -> Result<User, Error> {
        let registration = Registration::validate(form)?;
        let hash = self
            .hasher
            .hash(registration.password())
            .map_err(hasher_error)?;
        let user = User {
            id: UserId::random(),
            email: registration.email.clone(),
            username: registration.username.clone(),
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            avatar: None,
            is_staff: false,
        };
        self.users
            .insert(&user, &hash)
            .await
            .map_err(user_error)?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    async fn set_password(&self, user: &UserId, change: PasswordChange) -> Result<(), Error> {
        if let Err(err) = check_password(&change.new) {
            let mut violations = Violations::new();
            violations.push(FieldViolation::invalid(
                "newPassword",
                err.code(),
                err.to_string(),
            ));
            return Err(violations.into_error());
        }
        let current = self
            .users
            .password_hash(user)
            .await
            .map_err(user_error)?
            .ok_or_else(|| user_not_found(user))?;
        if !self.hasher.verify(&change.current, &current) {
            return Err(Error::invalid_request("current password is incorrect"));
        }
        let hash = self.hasher.hash(&change.new).map_err(hasher_error)?;
        if !self
            .users
            .set_password_hash(user, &hash)
            .await
            .map_err(user_error)?
        {
            return Err(user_not_found(user));
        }
        info!(user_id = %user, "password changed");
        Ok(())
    }

    async fn set_avatar(&self, user: &UserId, payload: ImagePayload) -> Result<ImageRef, Error> {
        let image = self
            .images
            .store(ImageKind::Avatar, &payload)
            .await
            .map_err(image_error)?;
        self.swap_avatar(user, Some(image.clone())).await?;
        Ok(image)
    }

    async fn clear_avatar(&self, user: &UserId) -> Result<(), Error> {
        self.swap_avatar(user, None).await
    }
}

#[async_trait]
impl<U, F> AccountQuery for AccountService<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    async fn profile(&self, viewer: Option<UserId>, id: &UserId) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(user_error)?
            .ok_or_else(|| user_not_found(id))?;
        let followed = self
            .followed_by(viewer.as_ref(), std::slice::from_ref(&user))
            .await?;
        Ok(UserProfile {
            is_subscribed: followed.contains(&user.id),
            user,
        })
    }

    async fn list(
        &self,
        viewer: Option<UserId>,
        request: PageRequest,
    ) -> Result<Page<UserProfile>, Error> {
        let page = self.users.list(request).await.map_err(user_error)?;
        let followed = self.followed_by(viewer.as_ref(), page.items()).await?;
        Ok(page.map(|user| UserProfile {
            is_subscribed: followed.contains(&user.id),
            user,
        }))
    }
}

#[async_trait]
impl<U, F> LoginService for AccountService<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(user_error)?;
        match stored {
            Some(stored) if self.hasher.verify(credentials.password(), &stored.password_hash) => {
                Ok(stored.user.id)
            }
            _ => {
                debug!("login rejected");
                Err(Error::unauthorized("invalid credentials"))
            }
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
