//! Ingredient and tag catalogue services.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::port_errors::{ingredient_error, tag_error, user_error};
use crate::domain::ports::{
    CatalogueCommand, CatalogueQuery, IngredientRepository, TagRepository, UserRepository,
};
use crate::domain::{
    Error, Ingredient, IngredientDraft, IngredientId, IngredientPatch, Tag, TagDraft, TagId,
    TagPatch, UserId,
};

/// Catalogue service implementing [`CatalogueQuery`] and [`CatalogueCommand`].
#[derive(Clone)]
pub struct CatalogueService<I, T, U> {
    ingredients: Arc<I>,
    tags: Arc<T>,
    users: Arc<U>,
}

impl<I, T, U> CatalogueService<I, T, U> {
    /// Create a new service with the given repositories.
    pub fn new(ingredients: Arc<I>, tags: Arc<T>, users: Arc<U>) -> Self {
        Self {
            ingredients,
            tags,
            users,
        }
    }
}

fn ingredient_not_found(id: IngredientId) -> Error {
    Error::not_found(format!("ingredient {id} not found"))
}

fn tag_not_found(id: TagId) -> Error {
    Error::not_found(format!("tag {id} not found"))
}

impl<I, T, U> CatalogueService<I, T, U>
where
    I: IngredientRepository,
    T: TagRepository,
    U: UserRepository,
{
    async fn require_staff(&self, actor: &UserId) -> Result<(), Error> {
        let user = self
            .users
            .find_by_id(actor)
            .await
            .map_err(user_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        if user.is_staff {
            Ok(())
        } else {
            Err(Error::forbidden("only staff may change the catalogue"))
        }
    }

    async fn load_ingredient(&self, id: IngredientId) -> Result<Ingredient, Error> {
        self.ingredients
            .find(id)
            .await
            .map_err(ingredient_error)?
            .ok_or_else(|| ingredient_not_found(id))
    }

    async fn load_tag(&self, id: TagId) -> Result<Tag, Error> {
        self.tags
            .find(id)
            .await
            .map_err(tag_error)?
            .ok_or_else(|| tag_not_found(id))
    }
}

#[async_trait]
impl<I, T, U> CatalogueQuery for CatalogueService<I, T, U>
where
    I: IngredientRepository,
    T: TagRepository,
    U: UserRepository,
{
    async fn ingredients(&self, name_prefix: Option<String>) -> Result<Vec<Ingredient>, Error> {
        let prefix = name_prefix
            .map(|prefix| prefix.trim().to_owned())
            .filter(|prefix| !prefix.is_empty());
        self.ingredients.list(prefix).await.map_err(ingredient_error)
    }

    async fn ingredient(&self, id: IngredientId) -> Result<Ingredient, Error> {
        self.load_ingredient(id).await
    }

    async fn tags(&self) -> Result<Vec<Tag>, Error> {
        self.tags.list().await.map_err(tag_error)
    }

    async fn tag(&self, id: TagId) -> Result<Tag, Error> {
        self.load_tag(id).await
    }
}

#[async_trait]
impl<I, T, U> CatalogueCommand for CatalogueService<I, T, U>
where
    I: IngredientRepository,
    T: TagRepository,
    U: UserRepository,
{
    async fn create_ingredient(
        &self,
        actor: &UserId,
        name: Option<String>,
        measurement_unit: Option<String>,
    ) -> Result<Ingredient, Error> {
        self.require_staff(actor).await?;
        let draft = IngredientDraft::validate(name, measurement_unit)?;
        let ingredient = self
            .ingredients
            .create(&draft)
            .await
            .map_err(ingredient_error)?;
        info!(ingredient_id = %ingredient.id, "ingredient created");
        Ok(ingredient)
    }

    async fn update_ingredient(
        &self,
        actor: &UserId,
        id: IngredientId,
        patch: IngredientPatch,
    ) -> Result<Ingredient, Error> {
        self.require_staff(actor).await?;
        let current = self.load_ingredient(id).await?;
        let draft = patch.apply(&current)?;
        self.ingredients
            .update(id, &draft)
            .await
            .map_err(ingredient_error)?
            .ok_or_else(|| ingredient_not_found(id))
    }

    async fn delete_ingredient(&self, actor: &UserId, id: IngredientId) -> Result<(), Error> {
        self.require_staff(actor).await?;
        if self.ingredients.delete(id).await.map_err(ingredient_error)? {
            info!(ingredient_id = %id, "ingredient deleted");
            Ok(())
        } else {
            Err(ingredient_not_found(id))
        }
    }

    async fn create_tag(
        &self,
        actor: &UserId,
        name: Option<String>,
        slug: Option<String>,
    ) -> Result<Tag, Error> {
        self.require_staff(actor).await?;
        let draft = TagDraft::validate(name, slug)?;
        let tag = self.tags.create(&draft).await.map_err(tag_error)?;
        info!(tag_id = %tag.id, slug = %tag.slug, "tag created");
        Ok(tag)
    }

    async fn update_tag(&self, actor: &UserId, id: TagId, patch: TagPatch) -> Result<Tag, Error> {
        self.require_staff(actor).await?;
        let current = self.load_tag(id).await?;
        let draft = patch.apply(&current)?;
        self.tags
            .update(id, &draft)
            .await
            .map_err(tag_error)?
            .ok_or_else(|| tag_not_found(id))
    }

    async fn delete_tag(&self, actor: &UserId, id: TagId) -> Result<(), Error> {
        self.require_staff(actor).await?;
        if self.tags.delete(id).await.map_err(tag_error)? {
            info!(tag_id = %id, "tag deleted");
            Ok(())
        } else {
            Err(tag_not_found(id))
        }
    }
}
