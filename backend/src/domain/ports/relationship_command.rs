//! Driving ports for favorites, the shopping cart and subscriptions.
//!
//! Every add is rejected with a conflict when the pair exists, every remove
//! with not-found when it does not, and following yourself is an invalid
//! operation.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, RecipeId, RecipeSummary, Subscription, UserId};

use super::RecipeList;

/// Domain use-case port for relationship changes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipCommand: Send + Sync {
    /// Add a recipe to one of the user's lists.
    async fn add_to_list(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<RecipeSummary, Error>;

    /// Remove a recipe from one of the user's lists.
    async fn remove_from_list(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<(), Error>;

    /// Subscribe `user` to `author`.
    async fn follow(
        &self,
        user: &UserId,
        author: &UserId,
        recipes_limit: Option<usize>,
    ) -> Result<Subscription, Error>;

    /// Cancel a subscription.
    async fn unfollow(&self, user: &UserId, author: &UserId) -> Result<(), Error>;

    async fn add_favorite(&self, user: &UserId, recipe: RecipeId) -> Result<RecipeSummary, Error> {
        self.add_to_list(RecipeList::Favorites, user, recipe).await
    }

    async fn remove_favorite(&self, user: &UserId, recipe: RecipeId) -> Result<(), Error> {
        self.remove_from_list(RecipeList::Favorites, user, recipe)
            .await
    }

    async fn add_to_cart(&self, user: &UserId, recipe: RecipeId) -> Result<RecipeSummary, Error> {
        self.add_to_list(RecipeList::ShoppingCart, user, recipe)
            .await
    }

    async fn remove_from_cart(&self, user: &UserId, recipe: RecipeId) -> Result<(), Error> {
        self.remove_from_list(RecipeList::ShoppingCart, user, recipe)
            .await
    }
}

/// Domain use-case port for reading subscriptions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipQuery: Send + Sync {
    /// Authors followed by `user`, each with a preview of their recipes.
    async fn subscriptions(
        &self,
        user: &UserId,
        request: PageRequest,
        recipes_limit: Option<usize>,
    ) -> Result<Page<Subscription>, Error>;
}
