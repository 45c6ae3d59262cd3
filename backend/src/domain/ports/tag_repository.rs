//! Port for tag persistence.

use async_trait::async_trait;

use crate::domain::{Tag, TagDraft, TagId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by tag repository adapters.
    pub enum TagRepositoryError for "tag repository" {
        /// Another tag already uses this slug.
        DuplicateSlug { slug: String } => "tag slug {slug} already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn create(&self, draft: &TagDraft) -> Result<Tag, TagRepositoryError>;

    /// Overwrite a tag; `None` when it does not exist.
    async fn update(&self, id: TagId, draft: &TagDraft) -> Result<Option<Tag>, TagRepositoryError>;

    /// Delete a tag and detach it from recipes; `false` when it does not
    /// exist.
    async fn delete(&self, id: TagId) -> Result<bool, TagRepositoryError>;

    async fn find(&self, id: TagId) -> Result<Option<Tag>, TagRepositoryError>;

    /// Every tag ordered by id.
    async fn list(&self) -> Result<Vec<Tag>, TagRepositoryError>;
}
