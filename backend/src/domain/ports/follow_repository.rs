//! Port for author subscriptions.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow repository adapters.
    pub enum FollowRepositoryError for "follow repository" {
        /// One of the users does not exist.
        MissingReference { message: String } => "follow references a missing user: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert the pair unless present, in one atomic statement. Returns
    /// `false` when it already existed.
    async fn follow(&self, follower: &UserId, author: &UserId)
    -> Result<bool, FollowRepositoryError>;

    /// Delete the pair. Returns `false` when it was absent.
    async fn unfollow(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowRepositoryError>;

    /// Subset of `authors` followed by `follower`.
    async fn followed_among(
        &self,
        follower: &UserId,
        authors: &[UserId],
    ) -> Result<Vec<UserId>, FollowRepositoryError>;

    /// Authors followed by `follower`, ordered by username.
    async fn followed(
        &self,
        follower: &UserId,
        request: PageRequest,
    ) -> Result<Page<User>, FollowRepositoryError>;
}
