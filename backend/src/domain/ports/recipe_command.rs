//! Driving port for recipe writes.

use async_trait::async_trait;

use crate::domain::{Error, RecipeDetails, RecipeId, RecipeSubmission, UserId};

/// Domain use-case port for creating, editing and deleting recipes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeCommand: Send + Sync {
    /// Validate and store a new recipe, assigning its short code.
    async fn create(
        &self,
        author: &UserId,
        submission: RecipeSubmission,
    ) -> Result<RecipeDetails, Error>;

    /// Replace a recipe's content. Only its author may do this.
    async fn update(
        &self,
        actor: &UserId,
        id: RecipeId,
        submission: RecipeSubmission,
    ) -> Result<RecipeDetails, Error>;

    /// Delete a recipe. Only its author may do this.
    async fn delete(&self, actor: &UserId, id: RecipeId) -> Result<(), Error>;
}
