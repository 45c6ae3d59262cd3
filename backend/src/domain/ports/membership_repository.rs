//! Port for per-user recipe lists: favorites and the shopping cart.
//!
//! Both lists hold unique `(user, recipe)` pairs and share one contract,
//! selected by [`RecipeList`].

use async_trait::async_trait;

use crate::domain::{RecipeId, ShoppingListEntry, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by membership repository adapters.
    pub enum MembershipRepositoryError for "membership repository" {
        /// The recipe or user referenced by the pair does not exist.
        MissingReference { message: String } =>
            "membership references a missing row: {message}",
    }
}

/// Which per-user list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    /// Human-readable list name for messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Insert the pair unless present, in one atomic statement. Returns
    /// `false` when the pair already existed.
    async fn add(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError>;

    /// Delete the pair. Returns `false` when it was absent.
    async fn remove(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError>;

    /// Subset of `recipes` present in the user's list.
    async fn contained(
        &self,
        list: RecipeList,
        user: &UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeId>, MembershipRepositoryError>;

    /// Ingredient rows of every recipe in the user's cart, ordered by the
    /// recipe ingredient row id.
    async fn cart_entries(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShoppingListEntry>, MembershipRepositoryError>;
}
