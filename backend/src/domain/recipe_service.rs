//! Recipe domain services.
//!
//! Implements the recipe driving ports: validated creation with short code
//! assignment, author-only edits, filtered listing, short link resolution
//! and the shopping list.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{debug, info};

use crate::domain::port_errors::{
    follow_error, image_error, log_discarded_image, membership_error, recipe_error,
};
use crate::domain::ports::{
    FollowRepository, ImageStore, MembershipRepository, NewRecipe, RecipeChanges, RecipeCommand,
    RecipeList, RecipeQuery, RecipeRepository, RecipeRepositoryError, ShortCodeSource,
};
use crate::domain::{
    Error, ImageKind, ImageRef, ImageRequirement, Recipe, RecipeDetails, RecipeDraft,
    RecipeFilter, RecipeId, RecipeSubmission, SHORT_CODE_ATTEMPTS, ShoppingList, ShortCode,
    UserId, UserProfile,
};

/// Recipe service implementing [`RecipeCommand`] and [`RecipeQuery`].
#[derive(Clone)]
pub struct RecipeService<R, M, F> {
    recipes: Arc<R>,
    memberships: Arc<M>,
    follows: Arc<F>,
    images: Arc<dyn ImageStore>,
    short_codes: Arc<dyn ShortCodeSource>,
    clock: Arc<dyn Clock>,
}

impl<R, M, F> RecipeService<R, M, F> {
    /// Create a new service with the given collaborators.
    pub fn new(
        recipes: Arc<R>,
        memberships: Arc<M>,
        follows: Arc<F>,
        images: Arc<dyn ImageStore>,
        short_codes: Arc<dyn ShortCodeSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            recipes,
            memberships,
            follows,
            images,
            short_codes,
            clock,
        }
    }
}

fn recipe_not_found(id: RecipeId) -> Error {
    Error::not_found(format!("recipe {id} not found"))
}

impl<R, M, F> RecipeService<R, M, F>
where
    R: RecipeRepository,
    M: MembershipRepository,
    F: FollowRepository,
{
    async fn load(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find(id)
            .await
            .map_err(recipe_error)?
            .ok_or_else(|| recipe_not_found(id))
    }

    async fn load_owned(&self, actor: &UserId, id: RecipeId) -> Result<Recipe, Error> {
        let recipe = self.load(id).await?;
        if &recipe.author.id != actor {
            return Err(Error::forbidden("only the author may change this recipe"));
        }
        Ok(recipe)
    }

    async fn check_references(&self, draft: &RecipeDraft) -> Result<(), Error> {
        let missing = self
            .recipes
            .missing_references(&draft.ingredient_ids(), &draft.tags)
            .await
            .map_err(recipe_error)?;
        match draft.reference_error(&missing) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn store_image(&self, draft: &RecipeDraft) -> Result<Option<ImageRef>, Error> {
        match &draft.image {
            Some(payload) => self
                .images
                .store(ImageKind::Recipe, payload)
                .await
                .map(Some)
                .map_err(image_error),
            None => Ok(None),
        }
    }

    async fn discard_image(&self, image: &ImageRef) {
        log_discarded_image(self.images.remove(image).await);
    }

    /// Assign a fresh short code and insert the recipe.
    ///
    /// Candidates already in use are skipped before inserting; a unique
    /// violation raised by the insert itself triggers another attempt.
    async fn insert_with_short_code(
        &self,
        build: impl Fn(ShortCode) -> NewRecipe + Send + Sync,
    ) -> Result<RecipeId, Error> {
        for attempt in 1..=SHORT_CODE_ATTEMPTS {
            let candidate = self.short_codes.next_code();
            if self
                .recipes
                .short_code_exists(&candidate)
                .await
                .map_err(recipe_error)?
            {
                debug!(attempt, "short code candidate already in use");
                continue;
            }
            match self.recipes.create(&build(candidate)).await {
                Ok(id) => return Ok(id),
                Err(RecipeRepositoryError::ShortCodeTaken { .. }) => {
                    debug!(attempt, "short code taken concurrently");
                }
                Err(other) => return Err(recipe_error(other)),
            }
        }
        Err(Error::internal(
            "could not allocate a unique short code for the recipe",
        ))
    }

    async fn decorate(
        &self,
        viewer: Option<&UserId>,
        recipes: Vec<Recipe>,
    ) -> Result<Vec<RecipeDetails>, Error> {
        let Some(viewer) = viewer else {
            return Ok(recipes
                .into_iter()
                .map(|recipe| RecipeDetails {
                    author: UserProfile {
                        user: recipe.author.clone(),
                        is_subscribed: false,
                    },
                    recipe,
                    is_favorited: false,
                    is_in_shopping_cart: false,
                })
                .collect());
        };

        let ids: Vec<RecipeId> = recipes.iter().map(|recipe| recipe.id).collect();
        let favorites = self.contained(RecipeList::Favorites, viewer, &ids).await?;
        let cart = self.contained(RecipeList::ShoppingCart, viewer, &ids).await?;
        let mut authors: Vec<UserId> = recipes
            .iter()
            .map(|recipe| recipe.author.id.clone())
            .filter(|author| author != viewer)
            .collect();
        authors.sort_by(|a, b| a.as_uuid().cmp(b.as_uuid()));
        authors.dedup();
        let followed: HashSet<UserId> = if authors.is_empty() {
            HashSet::new()
        } else {
            self.follows
                .followed_among(viewer, &authors)
                .await
                .map_err(follow_error)?
                .into_iter()
                .collect()
        };

        Ok(recipes
            .into_iter()
            .map(|recipe| RecipeDetails {
                author: UserProfile {
                    is_subscribed: followed.contains(&recipe.author.id),
                    user: recipe.author.clone(),
                },
                is_favorited: favorites.contains(&recipe.id),
                is_in_shopping_cart: cart.contains(&recipe.id),
                recipe,
            })
            .collect())
    }

    async fn contained(
        &self,
        list: RecipeList,
        viewer: &UserId,
        ids: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, Error> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        Ok(self
            .memberships
            .contained(list, viewer, ids)
            .await
            .map_err(membership_error)?
            .into_iter()
            .collect())
    }

    async fn details(&self, viewer: Option<&UserId>, id: RecipeId) -> Result<RecipeDetails, Error> {
        let recipe = self.load(id).await?;
        self.decorate(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| recipe_not_found(id))
    }
}

#[async_trait]
impl<R, M, F> RecipeCommand for RecipeService<R, M, F>
where
    R: RecipeRepository,
    M: MembershipRepository,
    F: FollowRepository,
{
    async fn create(
        &self,
        author: &UserId,
        submission: RecipeSubmission,
    ) -> Result<RecipeDetails, Error> {
        let draft = RecipeDraft::validate(submission, ImageRequirement::Required)?;
        self.check_references(&draft).await?;
        let image = self
            .store_image(&draft)
            .await?
            .ok_or_else(|| Error::internal("validated recipe lacks an image"))?;

        let created_at = self.clock.utc();
        let inserted = self
            .insert_with_short_code(|short_code| NewRecipe {
                author: author.clone(),
                name: draft.name.clone(),
                text: draft.text.clone(),
                image: image.clone(),
                cooking_time: draft.cooking_time,
                short_code,
                created_at,
                ingredients: draft.ingredients.clone(),
                tags: draft.tags.clone(),
            })
            .await;
        let id = match inserted {
            Ok(id) => id,
            Err(error) => {
                self.discard_image(&image).await;
                return Err(error);
            }
        };
        info!(recipe_id = %id, author = %author, "recipe created");
        self.details(Some(author), id).await
    }

    async fn update(
        &self,
        actor: &UserId,
        id: RecipeId,
        submission: RecipeSubmission,
    ) -> Result<RecipeDetails, Error> {
        let current = self.load_owned(actor, id).await?;
        let draft = RecipeDraft::validate(submission, ImageRequirement::Optional)?;
        self.check_references(&draft).await?;
        let image = self.store_image(&draft).await?;

        let changes = RecipeChanges {
            name: draft.name,
            text: draft.text,
            image: image.clone(),
            cooking_time: draft.cooking_time,
            ingredients: draft.ingredients,
            tags: draft.tags,
        };
        let updated = self.recipes.update(id, &changes).await;
        match (updated, image) {
            (Ok(true), Some(_)) => self.discard_image(&current.image).await,
            (Ok(true), None) => {}
            (outcome, Some(new_image)) => {
                self.discard_image(&new_image).await;
                outcome.map_err(recipe_error)?;
                return Err(recipe_not_found(id));
            }
            (outcome, None) => {
                outcome.map_err(recipe_error)?;
                return Err(recipe_not_found(id));
            }
        }
        info!(recipe_id = %id, "recipe updated");
        self.details(Some(actor), id).await
    }

    async fn delete(&self, actor: &UserId, id: RecipeId) -> Result<(), Error> {
        let current = self.load_owned(actor, id).await?;
        if !self.recipes.delete(id).await.map_err(recipe_error)? {
            return Err(recipe_not_found(id));
        }
        self.discard_image(&current.image).await;
        info!(recipe_id = %id, "recipe deleted");
        Ok(())
    }
}

#[async_trait]
impl<R, M, F> RecipeQuery for RecipeService<R, M, F>
where
    R: RecipeRepository,
    M: MembershipRepository,
    F: FollowRepository,
{
    async fn get(&self, viewer: Option<UserId>, id: RecipeId) -> Result<RecipeDetails, Error> {
        self.details(viewer.as_ref(), id).await
    }

    async fn list(
        &self,
        viewer: Option<UserId>,
        filter: &RecipeFilter,
        request: PageRequest,
    ) -> Result<Page<RecipeDetails>, Error> {
        let Some(search) = filter.resolve(viewer.as_ref()) else {
            return Ok(Page::new(Vec::new(), 0, request));
        };
        let page = self
            .recipes
            .search(&search, request)
            .await
            .map_err(recipe_error)?;
        let total = page.total();
        let items = self.decorate(viewer.as_ref(), page.into_items()).await?;
        Ok(Page::new(items, total, request))
    }

    async fn resolve(&self, code: &str) -> Result<RecipeId, Error> {
        let not_found = || Error::not_found(format!("short link {code} not found"));
        let code: ShortCode = code.parse().map_err(|_| not_found())?;
        self.recipes
            .find_id_by_short_code(&code)
            .await
            .map_err(recipe_error)?
            .ok_or_else(not_found)
    }

    async fn short_link(&self, id: RecipeId) -> Result<ShortCode, Error> {
        Ok(self.load(id).await?.short_code)
    }

    async fn shopping_list(&self, user: &UserId) -> Result<ShoppingList, Error> {
        let entries = self
            .memberships
            .cart_entries(user)
            .await
            .map_err(membership_error)?;
        Ok(ShoppingList::aggregate(entries))
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
