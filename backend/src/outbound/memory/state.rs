//! Table layout of the in-memory store.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::{
    ImageRef, Ingredient, IngredientId, PasswordHash, Recipe, RecipeId, RecipeIngredient,
    ShortCode, Tag, TagId, User, UserId,
};

pub(super) struct UserRow {
    pub user: User,
    pub password_hash: PasswordHash,
}

pub(super) struct RecipeRow {
    pub author: UserId,
    pub name: String,
    pub text: String,
    pub image: ImageRef,
    pub cooking_time: u16,
    pub short_code: ShortCode,
    pub created_at: DateTime<Utc>,
}

/// A recipe ingredient row; the vector position is its primary-key order.
pub(super) struct RecipeIngredientRow {
    pub recipe: RecipeId,
    pub ingredient: IngredientId,
    pub amount: u16,
}

/// Monotonic serial generator, starting at one like a `BIGSERIAL`.
#[derive(Default)]
pub(super) struct Serial(i64);

impl Serial {
    pub fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Default)]
pub(super) struct State {
    pub users: Vec<UserRow>,
    pub ingredients: BTreeMap<IngredientId, Ingredient>,
    pub tags: BTreeMap<TagId, Tag>,
    pub recipes: BTreeMap<RecipeId, RecipeRow>,
    pub recipe_ingredients: Vec<RecipeIngredientRow>,
    pub recipe_tags: BTreeSet<(RecipeId, TagId)>,
    pub favorites: HashSet<(UserId, RecipeId)>,
    pub cart: HashSet<(UserId, RecipeId)>,
    pub follows: HashSet<(UserId, UserId)>,
    pub ingredient_ids: Serial,
    pub tag_ids: Serial,
    pub recipe_ids: Serial,
}

impl State {
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users
            .iter()
            .map(|row| &row.user)
            .find(|user| &user.id == id)
    }

    pub fn user_row_mut(&mut self, id: &UserId) -> Option<&mut UserRow> {
        self.users.iter_mut().find(|row| &row.user.id == id)
    }

    /// Users sorted by username, the listing order of every user page.
    pub fn users_by_username(&self, keep: impl Fn(&User) -> bool) -> Vec<User> {
        let mut users: Vec<&User> = self
            .users
            .iter()
            .map(|row| &row.user)
            .filter(|user| keep(user))
            .collect();
        users.sort_by(|a, b| a.username.as_ref().cmp(b.username.as_ref()));
        users.into_iter().cloned().collect()
    }

    /// Recipe ids ordered newest first, ties broken by descending id.
    pub fn newest_first(&self, keep: impl Fn(RecipeId, &RecipeRow) -> bool) -> Vec<RecipeId> {
        let mut ids: Vec<(DateTime<Utc>, RecipeId)> = self
            .recipes
            .iter()
            .filter(|(id, row)| keep(**id, row))
            .map(|(id, row)| (row.created_at, *id))
            .collect();
        ids.sort_by(|a, b| b.cmp(a));
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Assemble the full recipe view, or `None` when a referenced row is gone.
    pub fn hydrate(&self, id: RecipeId) -> Option<Recipe> {
        let row = self.recipes.get(&id)?;
        let author = self.user(&row.author)?.clone();
        let tags = self
            .recipe_tags
            .range((id, TagId::new(i64::MIN))..=(id, TagId::new(i64::MAX)))
            .filter_map(|(_, tag)| self.tags.get(tag).cloned())
            .collect();
        let ingredients = self
            .recipe_ingredients
            .iter()
            .filter(|line| line.recipe == id)
            .filter_map(|line| {
                self.ingredients
                    .get(&line.ingredient)
                    .map(|ingredient| RecipeIngredient {
                        ingredient: ingredient.clone(),
                        amount: line.amount,
                    })
            })
            .collect();
        Some(Recipe {
            id,
            author,
            name: row.name.clone(),
            text: row.text.clone(),
            image: row.image.clone(),
            cooking_time: row.cooking_time,
            short_code: row.short_code.clone(),
            created_at: row.created_at,
            tags,
            ingredients,
        })
    }

    /// Delete a recipe together with every join row that references it.
    pub fn remove_recipe(&mut self, id: RecipeId) -> bool {
        if self.recipes.remove(&id).is_none() {
            return false;
        }
        self.recipe_ingredients.retain(|line| line.recipe != id);
        self.recipe_tags.retain(|(recipe, _)| *recipe != id);
        self.favorites.retain(|(_, recipe)| *recipe != id);
        self.cart.retain(|(_, recipe)| *recipe != id);
        true
    }
}
