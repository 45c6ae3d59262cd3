//! PostgreSQL-backed `UserRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{ImageRef, PasswordHash, User, UserId};

use super::diesel_basic_error_mapping::{
    ConstraintKind, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::{count_to_total, page_window};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: DieselError) -> UserPersistenceError {
    if let Some(violation) = constraint_violation(&error) {
        let field = [
            ("users_email_key", "email"),
            ("users_username_key", "username"),
            ("users_pkey", "id"),
        ]
        .into_iter()
        .find(|(constraint, _)| violation.is(ConstraintKind::Unique, constraint))
        .map(|(_, field)| field);
        if let Some(field) = field {
            return UserPersistenceError::duplicate(field);
        }
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

pub(super) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row.into_domain()
        .map_err(|err| UserPersistenceError::query(format!("stored user is invalid: {err}")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            username: user.username.as_ref(),
            first_name: user.first_name.as_ref(),
            last_name: user.last_name.as_ref(),
            avatar: user.avatar.as_ref().map(ImageRef::as_str),
            is_staff: user.is_staff,
            password_hash: password_hash.as_str(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let found: Option<(UserRow, String)> = users::table
            .filter(users::email.eq(email))
            .select((UserRow::as_select(), users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        found
            .map(|(row, hash)| {
                Ok(StoredCredentials {
                    user: row_to_user(row)?,
                    password_hash: PasswordHash::from_phc(hash),
                })
            })
            .transpose()
    }

    async fn password_hash(
        &self,
        id: &UserId,
    ) -> Result<Option<PasswordHash>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let hash: Option<String> = users::table
            .find(id.as_uuid())
            .select(users::password_hash)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(hash.map(PasswordHash::from_phc))
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(id.as_uuid()))
            .set(users::password_hash.eq(password_hash.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: Option<ImageRef>,
    ) -> Result<Option<Option<ImageRef>>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user_id = *id.as_uuid();
        let previous = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    let previous: Option<Option<String>> = users::table
                        .find(user_id)
                        .select(users::avatar)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    if previous.is_some() {
                        diesel::update(users::table.find(user_id))
                            .set(users::avatar.eq(avatar.as_ref().map(ImageRef::as_str)))
                            .execute(conn)
                            .await?;
                    }
                    Ok(previous)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(previous.map(|avatar| avatar.map(ImageRef::new)))
    }

    async fn list(&self, request: PageRequest) -> Result<Page<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let (limit, offset) = page_window(request);
        let rows: Vec<UserRow> = users::table
            .order((users::username.asc(), users::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let users = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(users, count_to_total(total), request))
    }
}
