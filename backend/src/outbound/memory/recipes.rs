//! [`RecipeRepository`] over the in-memory tables.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    AuthorRecipes, NewRecipe, RecipeChanges, RecipeRepository, RecipeRepositoryError,
};
use crate::domain::{
    IngredientAmount, IngredientId, MissingReferences, Recipe, RecipeId, RecipeSearch,
    RecipeSummary, ShortCode, TagId, UserId,
};

use super::InMemoryStore;
use super::state::{RecipeIngredientRow, RecipeRow, State};

fn check_references(
    state: &State,
    ingredients: &[IngredientAmount],
    tags: &[TagId],
) -> Result<(), RecipeRepositoryError> {
    if let Some(line) = ingredients
        .iter()
        .find(|line| !state.ingredients.contains_key(&line.ingredient))
    {
        return Err(RecipeRepositoryError::missing_reference(format!(
            "ingredient {}",
            line.ingredient
        )));
    }
    if let Some(tag) = tags.iter().find(|tag| !state.tags.contains_key(tag)) {
        return Err(RecipeRepositoryError::missing_reference(format!("tag {tag}")));
    }
    Ok(())
}

fn replace_links(state: &mut State, id: RecipeId, ingredients: &[IngredientAmount], tags: &[TagId]) {
    state.recipe_ingredients.retain(|line| line.recipe != id);
    state.recipe_tags.retain(|(recipe, _)| *recipe != id);
    state
        .recipe_ingredients
        .extend(ingredients.iter().map(|line| RecipeIngredientRow {
            recipe: id,
            ingredient: line.ingredient,
            amount: line.amount,
        }));
    state.recipe_tags.extend(tags.iter().map(|tag| (id, *tag)));
}

fn hydrate_all(state: &State, ids: Vec<RecipeId>) -> Result<Vec<Recipe>, RecipeRepositoryError> {
    ids.into_iter()
        .map(|id| {
            state
                .hydrate(id)
                .ok_or_else(|| RecipeRepositoryError::query(format!("recipe {id} is incomplete")))
        })
        .collect()
}

fn matches(state: &State, search: &RecipeSearch, id: RecipeId, row: &RecipeRow) -> bool {
    let tagged = search.tags.is_empty()
        || state
            .recipe_tags
            .iter()
            .filter(|(recipe, _)| *recipe == id)
            .filter_map(|(_, tag)| state.tags.get(tag))
            .any(|tag| search.tags.contains(&tag.slug));
    let by_author = search.author.as_ref().is_none_or(|author| &row.author == author);
    let favorited = search
        .favorited_by
        .as_ref()
        .is_none_or(|user| state.favorites.contains(&(user.clone(), id)));
    let in_cart = search
        .in_cart_of
        .as_ref()
        .is_none_or(|user| state.cart.contains(&(user.clone(), id)));
    tagged && by_author && favorited && in_cart
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn create(&self, recipe: &NewRecipe) -> Result<RecipeId, RecipeRepositoryError> {
        let mut state = self.lock();
        if state
            .recipes
            .values()
            .any(|row| row.short_code == recipe.short_code)
        {
            return Err(RecipeRepositoryError::short_code_taken(
                recipe.short_code.as_str(),
            ));
        }
        if state.user(&recipe.author).is_none() {
            return Err(RecipeRepositoryError::missing_reference(format!(
                "author {}",
                recipe.author
            )));
        }
        check_references(&state, &recipe.ingredients, &recipe.tags)?;

        let id = RecipeId::new(state.recipe_ids.next());
        state.recipes.insert(
            id,
            RecipeRow {
                author: recipe.author.clone(),
                name: recipe.name.clone(),
                text: recipe.text.clone(),
                image: recipe.image.clone(),
                cooking_time: recipe.cooking_time,
                short_code: recipe.short_code.clone(),
                created_at: recipe.created_at,
            },
        );
        replace_links(&mut state, id, &recipe.ingredients, &recipe.tags);
        Ok(id)
    }

    async fn update(
        &self,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<bool, RecipeRepositoryError> {
        let mut state = self.lock();
        if !state.recipes.contains_key(&id) {
            return Ok(false);
        }
        check_references(&state, &changes.ingredients, &changes.tags)?;
        if let Some(row) = state.recipes.get_mut(&id) {
            row.name.clone_from(&changes.name);
            row.text.clone_from(&changes.text);
            row.cooking_time = changes.cooking_time;
            if let Some(image) = &changes.image {
                row.image = image.clone();
            }
        }
        replace_links(&mut state, id, &changes.ingredients, &changes.tags);
        Ok(true)
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        Ok(self.lock().remove_recipe(id))
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        Ok(self.lock().hydrate(id))
    }

    async fn find_id_by_short_code(
        &self,
        code: &ShortCode,
    ) -> Result<Option<RecipeId>, RecipeRepositoryError> {
        Ok(self
            .lock()
            .recipes
            .iter()
            .find(|(_, row)| &row.short_code == code)
            .map(|(id, _)| *id))
    }

    async fn short_code_exists(&self, code: &ShortCode) -> Result<bool, RecipeRepositoryError> {
        Ok(self
            .lock()
            .recipes
            .values()
            .any(|row| &row.short_code == code))
    }

    async fn missing_references(
        &self,
        ingredients: &[IngredientId],
        tags: &[TagId],
    ) -> Result<MissingReferences, RecipeRepositoryError> {
        let state = self.lock();
        Ok(MissingReferences {
            ingredients: ingredients
                .iter()
                .filter(|id| !state.ingredients.contains_key(id))
                .copied()
                .collect(),
            tags: tags
                .iter()
                .filter(|id| !state.tags.contains_key(id))
                .copied()
                .collect(),
        })
    }

    async fn search(
        &self,
        search: &RecipeSearch,
        request: PageRequest,
    ) -> Result<Page<Recipe>, RecipeRepositoryError> {
        let state = self.lock();
        let ids = state.newest_first(|id, row| matches(&state, search, id, row));
        let page = Page::from_all(ids, request);
        let total = page.total();
        let recipes = hydrate_all(&state, page.into_items())?;
        Ok(Page::new(recipes, total, request))
    }

    async fn by_author(
        &self,
        author: &UserId,
        limit: Option<usize>,
    ) -> Result<AuthorRecipes, RecipeRepositoryError> {
        let state = self.lock();
        let ids = state.newest_first(|_, row| &row.author == author);
        let total = ids.len() as u64;
        let shown = ids.into_iter().take(limit.unwrap_or(usize::MAX)).collect();
        let recipes = hydrate_all(&state, shown)?
            .iter()
            .map(RecipeSummary::from)
            .collect();
        Ok(AuthorRecipes { recipes, total })
    }
}
