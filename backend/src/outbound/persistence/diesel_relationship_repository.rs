//! PostgreSQL-backed favourites, shopping cart and follow repositories.
//!
//! Adds are a single `INSERT .. ON CONFLICT DO NOTHING`, so concurrent
//! duplicate requests cannot both succeed.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{
    FollowRepository, FollowRepositoryError, MembershipRepository, MembershipRepositoryError,
    RecipeList,
};
use crate::domain::{RecipeId, ShoppingListEntry, User, UserId};

use super::diesel_basic_error_mapping::{
    ConstraintKind, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{count_to_total, narrow_u16, page_window};
use super::diesel_user_repository::row_to_user;
use super::models::{NewCartItemRow, NewFavoriteRow, NewFollowRow, UserRow};
use super::pool::DbPool;
use super::schema::{cart_items, favorites, follows, ingredients, recipe_ingredients, users};

/// Diesel-backed favourites and shopping cart.
#[derive(Clone)]
pub struct DieselMembershipRepository {
    pool: DbPool,
}

impl DieselMembershipRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_membership_error(error: DieselError) -> MembershipRepositoryError {
    match constraint_violation(&error) {
        Some(violation) if violation.kind == ConstraintKind::ForeignKey => {
            MembershipRepositoryError::missing_reference(
                violation.name.unwrap_or("foreign key").to_owned(),
            )
        }
        _ => map_basic_diesel_error(
            error,
            MembershipRepositoryError::query,
            MembershipRepositoryError::connection,
        ),
    }
}

#[async_trait]
impl MembershipRepository for DieselMembershipRepository {
    async fn add(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, MembershipRepositoryError::connection))?;
        let user_id = *user.as_uuid();
        let recipe_id = recipe.get();
        let inserted = match list {
            RecipeList::Favorites => {
                diesel::insert_into(favorites::table)
                    .values(NewFavoriteRow { user_id, recipe_id })
                    .on_conflict((favorites::user_id, favorites::recipe_id))
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
            RecipeList::ShoppingCart => {
                diesel::insert_into(cart_items::table)
                    .values(NewCartItemRow { user_id, recipe_id })
                    .on_conflict((cart_items::user_id, cart_items::recipe_id))
                    .do_nothing()
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_membership_error)?;
        Ok(inserted == 1)
    }

    async fn remove(
        &self,
        list: RecipeList,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, MembershipRepositoryError::connection))?;
        let user_id = *user.as_uuid();
        let recipe_id = recipe.get();
        let deleted = match list {
            RecipeList::Favorites => {
                diesel::delete(
                    favorites::table
                        .filter(favorites::user_id.eq(user_id))
                        .filter(favorites::recipe_id.eq(recipe_id)),
                )
                .execute(&mut conn)
                .await
            }
            RecipeList::ShoppingCart => {
                diesel::delete(
                    cart_items::table
                        .filter(cart_items::user_id.eq(user_id))
                        .filter(cart_items::recipe_id.eq(recipe_id)),
                )
                .execute(&mut conn)
                .await
            }
        }
        .map_err(map_membership_error)?;
        Ok(deleted == 1)
    }

    async fn contained(
        &self,
        list: RecipeList,
        user: &UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeId>, MembershipRepositoryError> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, MembershipRepositoryError::connection))?;
        let user_id = *user.as_uuid();
        let wanted: Vec<i64> = recipes.iter().map(|id| id.get()).collect();
        let found: Vec<i64> = match list {
            RecipeList::Favorites => {
                favorites::table
                    .filter(favorites::user_id.eq(user_id))
                    .filter(favorites::recipe_id.eq_any(&wanted))
                    .select(favorites::recipe_id)
                    .load(&mut conn)
                    .await
            }
            RecipeList::ShoppingCart => {
                cart_items::table
                    .filter(cart_items::user_id.eq(user_id))
                    .filter(cart_items::recipe_id.eq_any(&wanted))
                    .select(cart_items::recipe_id)
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(map_membership_error)?;
        Ok(found.into_iter().map(RecipeId::new).collect())
    }

    async fn cart_entries(
        &self,
        user: &UserId,
    ) -> Result<Vec<ShoppingListEntry>, MembershipRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, MembershipRepositoryError::connection))?;
        let rows: Vec<(String, String, i32)> = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(
                recipe_ingredients::recipe_id.eq_any(
                    cart_items::table
                        .filter(cart_items::user_id.eq(*user.as_uuid()))
                        .select(cart_items::recipe_id),
                ),
            )
            .order(recipe_ingredients::id.asc())
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load(&mut conn)
            .await
            .map_err(map_membership_error)?;
        rows.into_iter()
            .map(|(name, unit, amount)| {
                let amount = narrow_u16(amount, "amount").map_err(MembershipRepositoryError::query)?;
                Ok(ShoppingListEntry::new(name, unit, amount))
            })
            .collect()
    }
}

/// Diesel-backed author subscriptions.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_follow_error(error: DieselError) -> FollowRepositoryError {
    match constraint_violation(&error) {
        Some(violation) if violation.kind == ConstraintKind::ForeignKey => {
            FollowRepositoryError::missing_reference(
                violation.name.unwrap_or("foreign key").to_owned(),
            )
        }
        _ => map_basic_diesel_error(
            error,
            FollowRepositoryError::query,
            FollowRepositoryError::connection,
        ),
    }
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn follow(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, FollowRepositoryError::connection))?;
        let inserted = diesel::insert_into(follows::table)
            .values(NewFollowRow {
                follower_id: *follower.as_uuid(),
                author_id: *author.as_uuid(),
            })
            .on_conflict((follows::follower_id, follows::author_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_follow_error)?;
        Ok(inserted == 1)
    }

    async fn unfollow(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, FollowRepositoryError::connection))?;
        let deleted = diesel::delete(
            follows::table
                .filter(follows::follower_id.eq(*follower.as_uuid()))
                .filter(follows::author_id.eq(*author.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_follow_error)?;
        Ok(deleted == 1)
    }

    async fn followed_among(
        &self,
        follower: &UserId,
        authors: &[UserId],
    ) -> Result<Vec<UserId>, FollowRepositoryError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, FollowRepositoryError::connection))?;
        let wanted: Vec<Uuid> = authors.iter().map(|id| *id.as_uuid()).collect();
        let found: Vec<Uuid> = follows::table
            .filter(follows::follower_id.eq(*follower.as_uuid()))
            .filter(follows::author_id.eq_any(&wanted))
            .select(follows::author_id)
            .load(&mut conn)
            .await
            .map_err(map_follow_error)?;
        Ok(found.into_iter().map(UserId::from_uuid).collect())
    }

    async fn followed(
        &self,
        follower: &UserId,
        request: PageRequest,
    ) -> Result<Page<User>, FollowRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, FollowRepositoryError::connection))?;
        let follower_id = *follower.as_uuid();
        let total: i64 = follows::table
            .filter(follows::follower_id.eq(follower_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_follow_error)?;
        let (limit, offset) = page_window(request);
        let rows: Vec<UserRow> = users::table
            .filter(
                users::id.eq_any(
                    follows::table
                        .filter(follows::follower_id.eq(follower_id))
                        .select(follows::author_id),
                ),
            )
            .order((users::username.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_follow_error)?;
        let authors = rows
            .into_iter()
            .map(|row| {
                row_to_user(row).map_err(|err| FollowRepositoryError::query(err.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(authors, count_to_total(total), request))
    }
}
