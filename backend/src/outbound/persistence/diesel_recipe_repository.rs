//! PostgreSQL-backed `RecipeRepository` adapter.
//!
//! Writes run in a transaction covering the recipe row and its ingredient
//! and tag join rows. Reads load a page of recipe rows, then batch-load
//! authors, tags and ingredient lines for the whole page.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{
    AuthorRecipes, NewRecipe, RecipeChanges, RecipeRepository, RecipeRepositoryError,
};
use crate::domain::{
    ImageRef, Ingredient, IngredientAmount, IngredientId, MissingReferences, Recipe, RecipeId,
    RecipeIngredient, RecipeSearch, RecipeSummary, ShortCode, Tag, TagId, User, UserId,
};

use super::diesel_basic_error_mapping::{
    ConstraintKind, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{count_to_total, narrow_u16, page_window};
use super::models::{
    IngredientRow, NewRecipeIngredientRow, NewRecipeRow, NewRecipeTagRow, RecipeRow,
    RecipeUpdate, TagRow, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{
    cart_items, favorites, ingredients, recipe_ingredients, recipe_tags, recipes, tags, users,
};

/// Diesel-backed implementation of the recipe repository port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RecipeRepositoryError {
    map_basic_pool_error(error, RecipeRepositoryError::connection)
}

fn map_diesel_error(error: DieselError) -> RecipeRepositoryError {
    map_basic_diesel_error(
        error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

/// Map failures of a recipe write, recognising short code clashes and
/// vanished references.
fn map_write_error(error: DieselError, short_code: Option<&ShortCode>) -> RecipeRepositoryError {
    match (constraint_violation(&error), short_code) {
        (Some(violation), Some(code))
            if violation.is(ConstraintKind::Unique, "recipes_short_code_key") =>
        {
            RecipeRepositoryError::short_code_taken(code.as_str())
        }
        (Some(violation), _) if violation.kind == ConstraintKind::ForeignKey => {
            RecipeRepositoryError::missing_reference(
                violation.name.unwrap_or("foreign key").to_owned(),
            )
        }
        _ => map_diesel_error(error),
    }
}

fn corrupt(message: impl Into<String>) -> RecipeRepositoryError {
    RecipeRepositoryError::query(message.into())
}

fn ingredient_rows(recipe_id: i64, lines: &[IngredientAmount]) -> Vec<NewRecipeIngredientRow> {
    lines
        .iter()
        .map(|line| NewRecipeIngredientRow {
            recipe_id,
            ingredient_id: line.ingredient.get(),
            amount: i32::from(line.amount),
        })
        .collect()
}

fn tag_rows(recipe_id: i64, tags: &[TagId]) -> Vec<NewRecipeTagRow> {
    tags.iter()
        .map(|tag| NewRecipeTagRow {
            recipe_id,
            tag_id: tag.get(),
        })
        .collect()
}

async fn insert_links(
    conn: &mut AsyncPgConnection,
    recipe_id: i64,
    lines: &[IngredientAmount],
    tags: &[TagId],
) -> Result<(), DieselError> {
    let lines = ingredient_rows(recipe_id, lines);
    if !lines.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(&lines)
            .execute(conn)
            .await?;
    }
    let tags = tag_rows(recipe_id, tags);
    if !tags.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(&tags)
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Filter for a search. Sub-selects keep each recipe at most once even when
/// several tags match.
fn matching(search: &RecipeSearch) -> recipes::BoxedQuery<'static, Pg> {
    let mut query = recipes::table.into_boxed();
    if !search.tags.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .inner_join(tags::table)
                    .filter(tags::slug.eq_any(search.tags.clone()))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }
    if let Some(author) = &search.author {
        query = query.filter(recipes::author_id.eq(*author.as_uuid()));
    }
    if let Some(user) = &search.favorited_by {
        query = query.filter(
            recipes::id.eq_any(
                favorites::table
                    .filter(favorites::user_id.eq(*user.as_uuid()))
                    .select(favorites::recipe_id),
            ),
        );
    }
    if let Some(user) = &search.in_cart_of {
        query = query.filter(
            recipes::id.eq_any(
                cart_items::table
                    .filter(cart_items::user_id.eq(*user.as_uuid()))
                    .select(cart_items::recipe_id),
            ),
        );
    }
    query
}

/// Batch-load the related rows for `rows` and assemble full recipes in the
/// same order.
async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<RecipeRow>,
) -> Result<Vec<Recipe>, RecipeRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let author_ids: Vec<Uuid> = rows
        .iter()
        .map(|row| row.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(UserRow::as_select())
        .load::<UserRow>(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .map(|row| {
            let id = row.id;
            row.into_domain()
                .map(|user| (id, user))
                .map_err(|err| corrupt(format!("stored author is invalid: {err}")))
        })
        .collect::<Result<_, _>>()?;

    let mut tags_by_recipe: HashMap<i64, Vec<Tag>> = HashMap::new();
    let tag_rows: Vec<(i64, TagRow)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&ids))
        .order((recipe_tags::recipe_id.asc(), tags::id.asc()))
        .select((recipe_tags::recipe_id, TagRow::as_select()))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(tag.into());
    }

    let mut lines_by_recipe: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
    let line_rows: Vec<(i64, i32, IngredientRow)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&ids))
        .order(recipe_ingredients::id.asc())
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            IngredientRow::as_select(),
        ))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    for (recipe_id, amount, ingredient) in line_rows {
        lines_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredient {
                ingredient: Ingredient::from(ingredient),
                amount: narrow_u16(amount, "amount").map_err(corrupt)?,
            });
    }

    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| corrupt(format!("author of recipe {} is missing", row.id)))?;
            let short_code = row
                .short_code
                .parse::<ShortCode>()
                .map_err(|_| corrupt(format!("recipe {} has a malformed short code", row.id)))?;
            Ok(Recipe {
                id: RecipeId::new(row.id),
                author,
                name: row.name,
                text: row.text,
                image: ImageRef::new(row.image),
                cooking_time: narrow_u16(row.cooking_time, "cooking_time").map_err(corrupt)?,
                short_code,
                created_at: row.created_at,
                tags: tags_by_recipe.remove(&row.id).unwrap_or_default(),
                ingredients: lines_by_recipe.remove(&row.id).unwrap_or_default(),
            })
        })
        .collect()
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn create(&self, recipe: &NewRecipe) -> Result<RecipeId, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewRecipeRow {
            author_id: *recipe.author.as_uuid(),
            name: &recipe.name,
            text: &recipe.text,
            image: recipe.image.as_str(),
            cooking_time: i32::from(recipe.cooking_time),
            short_code: recipe.short_code.as_str(),
            created_at: recipe.created_at,
        };
        let id = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(recipes::table)
                        .values(&row)
                        .returning(recipes::id)
                        .get_result(conn)
                        .await?;
                    insert_links(conn, id, &recipe.ingredients, &recipe.tags).await?;
                    Ok(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_write_error(err, Some(&recipe.short_code)))?;
        Ok(RecipeId::new(id))
    }

    async fn update(
        &self,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = RecipeUpdate {
            name: &changes.name,
            text: &changes.text,
            image: changes.image.as_ref().map(ImageRef::as_str),
            cooking_time: i32::from(changes.cooking_time),
        };
        let recipe_id = id.get();
        conn.transaction::<_, DieselError, _>(|conn| {
            async move {
                let updated = diesel::update(recipes::table.find(recipe_id))
                    .set(&update)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Ok(false);
                }
                diesel::delete(
                    recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
                )
                .execute(conn)
                .await?;
                diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
                    .execute(conn)
                    .await?;
                insert_links(conn, recipe_id, &changes.ingredients, &changes.tags).await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, None))
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(recipes::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted == 1)
    }

    async fn find(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = recipes::table
            .find(id.get())
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(hydrate(&mut conn, vec![row]).await?.pop())
    }

    async fn find_id_by_short_code(
        &self,
        code: &ShortCode,
    ) -> Result<Option<RecipeId>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: Option<i64> = recipes::table
            .filter(recipes::short_code.eq(code.as_str()))
            .select(recipes::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(id.map(RecipeId::new))
    }

    async fn short_code_exists(&self, code: &ShortCode) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            recipes::table.filter(recipes::short_code.eq(code.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn missing_references(
        &self,
        ingredients: &[IngredientId],
        tags: &[TagId],
    ) -> Result<MissingReferences, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let wanted: Vec<i64> = ingredients.iter().map(|id| id.get()).collect();
        let found: HashSet<i64> = ingredients::table
            .filter(ingredients::id.eq_any(&wanted))
            .select(ingredients::id)
            .load::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();
        let missing_ingredients = ingredients
            .iter()
            .filter(|id| !found.contains(&id.get()))
            .copied()
            .collect();

        let wanted: Vec<i64> = tags.iter().map(|id| id.get()).collect();
        let found: HashSet<i64> = tags::table
            .filter(tags::id.eq_any(&wanted))
            .select(tags::id)
            .load::<i64>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .collect();
        let missing_tags = tags
            .iter()
            .filter(|id| !found.contains(&id.get()))
            .copied()
            .collect();

        Ok(MissingReferences {
            ingredients: missing_ingredients,
            tags: missing_tags,
        })
    }

    async fn search(
        &self,
        search: &RecipeSearch,
        request: PageRequest,
    ) -> Result<Page<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = matching(search)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(request);
        let rows: Vec<RecipeRow> = matching(search)
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let recipes = hydrate(&mut conn, rows).await?;
        Ok(Page::new(recipes, count_to_total(total), request))
    }

    async fn by_author(
        &self,
        author: &UserId,
        limit: Option<usize>,
    ) -> Result<AuthorRecipes, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let author_id = *author.as_uuid();
        let total: i64 = recipes::table
            .filter(recipes::author_id.eq(author_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let mut query = recipes::table
            .filter(recipes::author_id.eq(author_id))
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .select((
                recipes::id,
                recipes::name,
                recipes::image,
                recipes::cooking_time,
            ))
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let rows: Vec<(i64, String, String, i32)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        let recipes = rows
            .into_iter()
            .map(|(id, name, image, cooking_time)| {
                Ok(RecipeSummary {
                    id: RecipeId::new(id),
                    name,
                    image: ImageRef::new(image),
                    cooking_time: narrow_u16(cooking_time, "cooking_time").map_err(corrupt)?,
                })
            })
            .collect::<Result<_, RecipeRepositoryError>>()?;
        Ok(AuthorRecipes {
            recipes,
            total: count_to_total(total),
        })
    }
}
