//! Favorites, cart and follow repositories over the in-memory tables.

use std::collections::HashSet;

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    FollowRepository, FollowRepositoryError, MembershipRepository, MembershipRepositoryError,
    RecipeList,
};
use crate::domain::{RecipeId, ShoppingListEntry, User, UserId};

use super::InMemoryStore;
use super::state::State;

fn list_mut(state: &mut State, list: RecipeList) -> &mut HashSet<(UserId, RecipeId)> {
    match list {
        RecipeList::Favorites => &mut state.favorites,
        RecipeList::ShoppingCart => &mut state.cart,
    }
}

fn list_ref(state: &State, list: RecipeList) -> &HashSet<(UserId, RecipeId)> {
    match list {
        RecipeList::Favorites => &state.favorites,
        RecipeList::ShoppingCart => &state.cart,
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn add(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut state = self.lock();
        if state.user(user).is_none() {
            return Err(MembershipRepositoryError::missing_reference(format!(
                "user {user}"
            )));
        }
        if !state.recipes.contains_key(&recipe) {
            return Err(MembershipRepositoryError::missing_reference(format!(
                "recipe {recipe}"
            )));
        }
        Ok(list_mut(&mut state, list).insert((user.clone(), recipe)))
    }

    async fn remove(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut state = self.lock();
        Ok(list_mut(&mut state, list).remove(&(user.clone(), recipe)))
    }

    async fn contained(
        &self,
        list: RecipeList,
        user: &UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeId>, MembershipRepositoryError> {
        let state = self.lock();
        let members = list_ref(&state, list);
        Ok(recipes
            .iter()
            .filter(|recipe| members.contains(&(user.clone(), **recipe)))
            .copied()
            .collect())
    }

    async fn cart_entries(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShoppingListEntry>, MembershipRepositoryError> {
        let state = self.lock();
        Ok(state
            .recipe_ingredients
            .iter()
            .filter(|line| state.cart.contains(&(user.clone(), line.recipe)))
            .filter_map(|line| {
                state.ingredients.get(&line.ingredient).map(|ingredient| {
                    ShoppingListEntry::new(
                        ingredient.name.clone(),
                        ingredient.measurement_unit.clone(),
                        line.amount,
                    )
                })
            })
            .collect())
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn follow(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowRepositoryError> {
        let mut state = self.lock();
        for id in [follower, author] {
            if state.user(id).is_none() {
                return Err(FollowRepositoryError::missing_reference(format!("user {id}")));
            }
        }
        if follower == author {
            return Err(FollowRepositoryError::query("users cannot follow themselves"));
        }
        Ok(state.follows.insert((follower.clone(), author.clone())))
    }

    async fn unfollow(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowRepositoryError> {
        Ok(self
            .lock()
            .follows
            .remove(&(follower.clone(), author.clone())))
    }

    async fn followed_among(
        &self,
        follower: &UserId,
        authors: &[UserId],
    ) -> Result<Vec<UserId>, FollowRepositoryError> {
        let state = self.lock();
        Ok(authors
            .iter()
            .filter(|author| state.follows.contains(&(follower.clone(), (*author).clone())))
            .cloned()
            .collect())
    }

    async fn followed(
        &self,
        follower: &UserId,
        request: PageRequest,
    ) -> Result<Page<User>, FollowRepositoryError> {
        let state = self.lock();
        let users = state.users_by_username(|user: &User| {
            state.follows.contains(&(follower.clone(), user.id.clone()))
        });
        Ok(Page::from_all(users, request))
    }
}
