//! Port for recipe persistence.
//!
//! Adapters store the recipe row together with its ingredient and tag join
//! rows. Creation and update are atomic: either every row is written or
//! none is.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{
    ImageRef, IngredientAmount, IngredientId, MissingReferences, Recipe, RecipeId, RecipeSearch,
    RecipeSummary, ShortCode, TagId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError for "recipe repository" {
        /// Another recipe already owns the short code.
        ShortCodeTaken { code: String } => "short code {code} is already taken",
        /// A referenced ingredient, tag or author vanished mid-write.
        MissingReference { message: String } => "recipe references a missing row: {message}",
    }
}

/// Everything needed to insert a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub author: UserId,
    pub name: String,
    pub text: String,
    pub image: ImageRef,
    pub cooking_time: u16,
    pub short_code: ShortCode,
    pub created_at: DateTime<Utc>,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<TagId>,
}

/// Replacement values for an existing recipe. The short code, author and
/// creation time never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeChanges {
    pub name: String,
    pub text: String,
    /// `None` keeps the stored image.
    pub image: Option<ImageRef>,
    pub cooking_time: u16,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<TagId>,
}

/// Recipes of one author, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorRecipes {
    pub recipes: Vec<RecipeSummary>,
    pub total: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert the recipe and its join rows in one transaction.
    async fn create(&self, recipe: &NewRecipe) -> Result<RecipeId, RecipeRepositoryError>;

    /// Replace fields and join rows in one transaction; `false` when the
    /// recipe does not exist.
    async fn update(
        &self,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<bool, RecipeRepositoryError>;

    /// Delete the recipe and cascade to its join rows.
    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError>;

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    async fn find_id_by_short_code(
        &self,
        code: &ShortCode,
    ) -> Result<Option<RecipeId>, RecipeRepositoryError>;

    async fn short_code_exists(&self, code: &ShortCode) -> Result<bool, RecipeRepositoryError>;

    /// Report which of the given ids do not exist.
    async fn missing_references(
        &self,
        ingredients: &[IngredientId],
        tags: &[TagId],
    ) -> Result<MissingReferences, RecipeRepositoryError>;

    /// Run a filtered search ordered newest first (ties by id descending).
    async fn search(
        &self,
        search: &RecipeSearch,
        request: PageRequest,
    ) -> Result<Page<Recipe>, RecipeRepositoryError>;

    /// Newest recipes of `author`, optionally truncated, with the full count.
    async fn by_author(
        &self,
        author: &UserId,
        limit: Option<usize>,
    ) -> Result<AuthorRecipes, RecipeRepositoryError>;
}
