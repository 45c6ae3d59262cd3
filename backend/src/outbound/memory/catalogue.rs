//! Ingredient and tag repositories over the in-memory tables.

use async_trait::async_trait;

use crate::domain::ports::{
    IngredientRepository, IngredientRepositoryError, TagRepository, TagRepositoryError,
};
use crate::domain::{Ingredient, IngredientDraft, IngredientId, Tag, TagDraft, TagId};

use super::InMemoryStore;
use super::state::State;

fn ingredient_clash(
    state: &State,
    draft: &IngredientDraft,
    except: Option<IngredientId>,
) -> Option<IngredientRepositoryError> {
    state
        .ingredients
        .values()
        .filter(|existing| Some(existing.id) != except)
        .any(|existing| {
            existing.name == draft.name() && existing.measurement_unit == draft.measurement_unit()
        })
        .then(|| IngredientRepositoryError::duplicate(draft.name(), draft.measurement_unit()))
}

fn insert_ingredient(state: &mut State, draft: &IngredientDraft) -> Ingredient {
    let id = IngredientId::new(state.ingredient_ids.next());
    let ingredient = Ingredient {
        id,
        name: draft.name().to_owned(),
        measurement_unit: draft.measurement_unit().to_owned(),
    };
    state.ingredients.insert(id, ingredient.clone());
    ingredient
}

#[async_trait]
impl IngredientRepository for InMemoryStore {
    async fn create(
        &self,
        draft: &IngredientDraft,
    ) -> Result<Ingredient, IngredientRepositoryError> {
        let mut state = self.lock();
        if let Some(err) = ingredient_clash(&state, draft, None) {
            return Err(err);
        }
        Ok(insert_ingredient(&mut state, draft))
    }

    async fn create_if_absent(
        &self,
        draft: &IngredientDraft,
    ) -> Result<bool, IngredientRepositoryError> {
        let mut state = self.lock();
        if ingredient_clash(&state, draft, None).is_some() {
            return Ok(false);
        }
        insert_ingredient(&mut state, draft);
        Ok(true)
    }

    async fn update(
        &self,
        id: IngredientId,
        draft: &IngredientDraft,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        let mut state = self.lock();
        if !state.ingredients.contains_key(&id) {
            return Ok(None);
        }
        if let Some(err) = ingredient_clash(&state, draft, Some(id)) {
            return Err(err);
        }
        Ok(state.ingredients.get_mut(&id).map(|ingredient| {
            ingredient.name = draft.name().to_owned();
            ingredient.measurement_unit = draft.measurement_unit().to_owned();
            ingredient.clone()
        }))
    }

    async fn delete(&self, id: IngredientId) -> Result<bool, IngredientRepositoryError> {
        let mut state = self.lock();
        if state
            .recipe_ingredients
            .iter()
            .any(|line| line.ingredient == id)
        {
            return Err(IngredientRepositoryError::in_use(id.get()));
        }
        Ok(state.ingredients.remove(&id).is_some())
    }

    async fn find(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        Ok(self.lock().ingredients.get(&id).cloned())
    }

    async fn list(
        &self,
        name_prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let prefix = name_prefix.map(|prefix| prefix.to_lowercase());
        let mut found: Vec<Ingredient> = self
            .lock()
            .ingredients
            .values()
            .filter(|ingredient| {
                prefix
                    .as_deref()
                    .is_none_or(|prefix| ingredient.name.to_lowercase().starts_with(prefix))
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(found)
    }
}

fn slug_clash(state: &State, draft: &TagDraft, except: Option<TagId>) -> Option<TagRepositoryError> {
    state
        .tags
        .values()
        .any(|tag| Some(tag.id) != except && tag.slug == draft.slug())
        .then(|| TagRepositoryError::duplicate_slug(draft.slug()))
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn create(&self, draft: &TagDraft) -> Result<Tag, TagRepositoryError> {
        let mut state = self.lock();
        if let Some(err) = slug_clash(&state, draft, None) {
            return Err(err);
        }
        let id = TagId::new(state.tag_ids.next());
        let tag = Tag {
            id,
            name: draft.name().to_owned(),
            slug: draft.slug().to_owned(),
        };
        state.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn update(&self, id: TagId, draft: &TagDraft) -> Result<Option<Tag>, TagRepositoryError> {
        let mut state = self.lock();
        if !state.tags.contains_key(&id) {
            return Ok(None);
        }
        if let Some(err) = slug_clash(&state, draft, Some(id)) {
            return Err(err);
        }
        Ok(state.tags.get_mut(&id).map(|tag| {
            tag.name = draft.name().to_owned();
            tag.slug = draft.slug().to_owned();
            tag.clone()
        }))
    }

    async fn delete(&self, id: TagId) -> Result<bool, TagRepositoryError> {
        let mut state = self.lock();
        if state.tags.remove(&id).is_none() {
            return Ok(false);
        }
        state.recipe_tags.retain(|(_, tag)| *tag != id);
        Ok(true)
    }

    async fn find(&self, id: TagId) -> Result<Option<Tag>, TagRepositoryError> {
        Ok(self.lock().tags.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Tag>, TagRepositoryError> {
        Ok(self.lock().tags.values().cloned().collect())
    }
}
