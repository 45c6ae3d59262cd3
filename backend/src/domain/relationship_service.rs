//! Relationship guard services: favorites, shopping cart and subscriptions.
//!
//! Adds are single insert-if-absent statements in the adapters, so a
//! duplicate add reports a conflict even under concurrent requests.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::port_errors::{follow_error, membership_error, recipe_error, user_error};
use crate::domain::ports::{
    FollowRepository, MembershipRepository, RecipeList, RecipeRepository, RelationshipCommand,
    RelationshipQuery, UserRepository,
};
use crate::domain::{Error, Recipe, RecipeId, RecipeSummary, Subscription, User, UserId};

/// Service implementing [`RelationshipCommand`] and [`RelationshipQuery`].
#[derive(Clone)]
pub struct RelationshipService<R, M, U, F> {
    recipes: Arc<R>,
    memberships: Arc<M>,
    users: Arc<U>,
    follows: Arc<F>,
}

impl<R, M, U, F> RelationshipService<R, M, U, F> {
    /// Create a new service with the given repositories.
    pub fn new(recipes: Arc<R>, memberships: Arc<M>, users: Arc<U>, follows: Arc<F>) -> Self {
        Self {
            recipes,
            memberships,
            users,
            follows,
        }
    }
}

impl<R, M, U, F> RelationshipService<R, M, U, F>
where
    R: RecipeRepository,
    M: MembershipRepository,
    U: UserRepository,
    F: FollowRepository,
{
    async fn recipe(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(id)
            .await
            .map_err(recipe_error)?
            .ok_or_else(|| Error::not_found(format!("recipe {id} not found")))
    }

    async fn author(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(user_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn subscription(
        &self,
        author: User,
        recipes_limit: Option<usize>,
    ) -> Result<Subscription, Error> {
        let preview = self
            .recipes
            .by_author(&author.id, recipes_limit)
            .await
            .map_err(recipe_error)?;
        Ok(Subscription {
            author,
            recipes: preview.recipes,
            recipes_count: preview.total,
        })
    }
}

#[async_trait]
impl<R, M, U, F> RelationshipCommand for RelationshipService<R, M, U, F>
where
    R: RecipeRepository,
    M: MembershipRepository,
    U: UserRepository,
    F: FollowRepository,
{
    async fn add_to_list(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<RecipeSummary, Error> {
        let recipe = self.recipe(recipe).await?;
        let inserted = self
            .memberships
            .add(list, user, recipe.id)
            .await
            .map_err(membership_error)?;
        if !inserted {
            return Err(Error::conflict(format!(
                "recipe {} is already in your {}",
                recipe.id,
                list.label()
            )));
        }
        info!(recipe_id = %recipe.id, user = %user, list = list.label(), "recipe added to list");
        Ok(RecipeSummary::from(&recipe))
    }

    async fn remove_from_list(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<(), Error> {
        let recipe = self.recipe(recipe).await?;
        let removed = self
            .memberships
            .remove(list, user, recipe.id)
            .await
            .map_err(membership_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "recipe {} is not in your {}",
                recipe.id,
                list.label()
            )));
        }
        Ok(())
    }

    async fn follow(
        &self,
        user: &UserId,
        author: &UserId,
        recipes_limit: Option<usize>,
    ) -> Result<Subscription, Error> {
        if user == author {
            return Err(Error::invalid_operation("you cannot subscribe to yourself"));
        }
        let author = self.author(author).await?;
        let inserted = self
            .follows
            .follow(user, &author.id)
            .await
            .map_err(follow_error)?;
        if !inserted {
            return Err(Error::conflict(format!(
                "you are already subscribed to {}",
                author.username
            )));
        }
        info!(follower = %user, author = %author.id, "subscription created");
        self.subscription(author, recipes_limit).await
    }

    async fn unfollow(&self, user: &UserId, author: &UserId) -> Result<(), Error> {
        let author = self.author(author).await?;
        let removed = self
            .follows
            .unfollow(user, &author.id)
            .await
            .map_err(follow_error)?;
        if !removed {
            return Err(Error::not_found(format!(
                "you are not subscribed to {}",
                author.username
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<R, M, U, F> RelationshipQuery for RelationshipService<R, M, U, F>
where
    R: RecipeRepository,
    M: MembershipRepository,
    U: UserRepository,
    F: FollowRepository,
{
    async fn subscriptions(
        &self,
        user: &UserId,
        request: PageRequest,
        recipes_limit: Option<usize>,
    ) -> Result<Page<Subscription>, Error> {
        let page = self
            .follows
            .followed(user, request)
            .await
            .map_err(follow_error)?;
        let total = page.total();
        let mut items = Vec::with_capacity(page.items().len());
        for author in page.into_items() {
            items.push(self.subscription(author, recipes_limit).await?);
        }
        Ok(Page::new(items, total, request))
    }
}

#[cfg(test)]
#[path = "relationship_service_tests.rs"]
mod tests;
