//! Driving port for recipe reads, short links and the shopping list.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Error, RecipeDetails, RecipeFilter, RecipeId, ShoppingList, ShortCode, UserId,
};

/// Domain use-case port for reading recipes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    /// Fetch one recipe as seen by `viewer`.
    async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeDetails, Error>;

    /// Filtered, paginated listing, newest first.
    async fn list(
        &self,
        viewer: Option<UserId>,
        filter: &RecipeFilter,
        request: PageRequest,
    ) -> Result<Page<RecipeDetails>, Error>;

    /// Resolve a short code to its recipe. Unknown or malformed codes are
    /// reported as not found.
    async fn resolve(&self, code: &str) -> Result<RecipeId, Error>;

    /// Stored short code of an existing recipe.
    async fn short_link(&self, id: RecipeId) -> Result<ShortCode, Error>;

    /// Aggregated shopping list for the recipes in the user's cart.
    async fn shopping_list(&self, user: &UserId) -> Result<ShoppingList, Error>;
}
