//! PostgreSQL-backed ingredient and tag repositories.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    IngredientRepository, IngredientRepositoryError, TagRepository, TagRepositoryError,
};
use crate::domain::{Ingredient, IngredientDraft, IngredientId, Tag, TagDraft, TagId};

use super::diesel_basic_error_mapping::{
    ConstraintKind, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_helpers::escape_like;
use super::models::{IngredientFields, IngredientRow, TagFields, TagRow};
use super::pool::DbPool;
use super::schema::{ingredients, tags};

/// Diesel-backed ingredient catalogue.
#[derive(Clone)]
pub struct DieselIngredientRepository {
    pool: DbPool,
}

impl DieselIngredientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn ingredient_fields(draft: &IngredientDraft) -> IngredientFields<'_> {
    IngredientFields {
        name: draft.name(),
        measurement_unit: draft.measurement_unit(),
    }
}

/// Map Diesel errors for a write touching `draft` (or deleting `id`).
fn map_ingredient_error(
    error: DieselError,
    draft: Option<&IngredientDraft>,
    id: Option<IngredientId>,
) -> IngredientRepositoryError {
    match (constraint_violation(&error), draft, id) {
        (Some(violation), Some(draft), _)
            if violation.is(ConstraintKind::Unique, "ingredients_name_unit_key") =>
        {
            IngredientRepositoryError::duplicate(draft.name(), draft.measurement_unit())
        }
        (Some(violation), _, Some(id)) if violation.kind == ConstraintKind::ForeignKey => {
            IngredientRepositoryError::in_use(id.get())
        }
        _ => map_basic_diesel_error(
            error,
            IngredientRepositoryError::query,
            IngredientRepositoryError::connection,
        ),
    }
}

fn map_ingredient_query_error(error: DieselError) -> IngredientRepositoryError {
    map_ingredient_error(error, None, None)
}

#[async_trait]
impl IngredientRepository for DieselIngredientRepository {
    async fn create(
        &self,
        draft: &IngredientDraft,
    ) -> Result<Ingredient, IngredientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, IngredientRepositoryError::connection))?;
        let row = diesel::insert_into(ingredients::table)
            .values(ingredient_fields(draft))
            .returning(IngredientRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_ingredient_error(err, Some(draft), None))?;
        Ok(row.into())
    }

    async fn create_if_absent(
        &self,
        draft: &IngredientDraft,
    ) -> Result<bool, IngredientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, IngredientRepositoryError::connection))?;
        let inserted = diesel::insert_into(ingredients::table)
            .values(ingredient_fields(draft))
            .on_conflict((ingredients::name, ingredients::measurement_unit))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_ingredient_query_error)?;
        Ok(inserted == 1)
    }

    async fn update(
        &self,
        id: IngredientId,
        draft: &IngredientDraft,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, IngredientRepositoryError::connection))?;
        let row = diesel::update(ingredients::table.find(id.get()))
            .set(ingredient_fields(draft))
            .returning(IngredientRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_ingredient_error(err, Some(draft), None))?;
        Ok(row.map(Ingredient::from))
    }

    async fn delete(&self, id: IngredientId) -> Result<bool, IngredientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, IngredientRepositoryError::connection))?;
        let deleted = diesel::delete(ingredients::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_ingredient_error(err, None, Some(id)))?;
        Ok(deleted == 1)
    }

    async fn find(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, IngredientRepositoryError::connection))?;
        let row = ingredients::table
            .find(id.get())
            .select(IngredientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_ingredient_query_error)?;
        Ok(row.map(Ingredient::from))
    }

    async fn list(
        &self,
        name_prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, IngredientRepositoryError::connection))?;
        let mut query = ingredients::table
            .select(IngredientRow::as_select())
            .order((ingredients::name.asc(), ingredients::id.asc()))
            .into_boxed();
        if let Some(prefix) = name_prefix.filter(|prefix| !prefix.is_empty()) {
            query = query.filter(ingredients::name.ilike(format!("{}%", escape_like(&prefix))));
        }
        let rows = query
            .load(&mut conn)
            .await
            .map_err(map_ingredient_query_error)?;
        Ok(rows.into_iter().map(Ingredient::from).collect())
    }
}

/// Diesel-backed tag catalogue.
#[derive(Clone)]
pub struct DieselTagRepository {
    pool: DbPool,
}

impl DieselTagRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn tag_fields(draft: &TagDraft) -> TagFields<'_> {
    TagFields {
        name: draft.name(),
        slug: draft.slug(),
    }
}

fn map_tag_error(error: DieselError, draft: Option<&TagDraft>) -> TagRepositoryError {
    match (constraint_violation(&error), draft) {
        (Some(violation), Some(draft)) if violation.is(ConstraintKind::Unique, "tags_slug_key") => {
            TagRepositoryError::duplicate_slug(draft.slug())
        }
        _ => map_basic_diesel_error(error, TagRepositoryError::query, TagRepositoryError::connection),
    }
}

#[async_trait]
impl TagRepository for DieselTagRepository {
    async fn create(&self, draft: &TagDraft) -> Result<Tag, TagRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, TagRepositoryError::connection))?;
        let row = diesel::insert_into(tags::table)
            .values(tag_fields(draft))
            .returning(TagRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_tag_error(err, Some(draft)))?;
        Ok(row.into())
    }

    async fn update(&self, id: TagId, draft: &TagDraft) -> Result<Option<Tag>, TagRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, TagRepositoryError::connection))?;
        let row = diesel::update(tags::table.find(id.get()))
            .set(tag_fields(draft))
            .returning(TagRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_tag_error(err, Some(draft)))?;
        Ok(row.map(Tag::from))
    }

    async fn delete(&self, id: TagId) -> Result<bool, TagRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, TagRepositoryError::connection))?;
        // recipe_tags rows go with the tag via ON DELETE CASCADE.
        let deleted = diesel::delete(tags::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_tag_error(err, None))?;
        Ok(deleted == 1)
    }

    async fn find(&self, id: TagId) -> Result<Option<Tag>, TagRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, TagRepositoryError::connection))?;
        let row = tags::table
            .find(id.get())
            .select(TagRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_tag_error(err, None))?;
        Ok(row.map(Tag::from))
    }

    async fn list(&self) -> Result<Vec<Tag>, TagRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_basic_pool_error(err, TagRepositoryError::connection))?;
        let rows = tags::table
            .select(TagRow::as_select())
            .order(tags::id.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_tag_error(err, None))?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::DatabaseErrorKind;
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new("constraint".to_owned()))
    }

    #[rstest]
    fn foreign_key_violation_on_delete_means_in_use() {
        let err = map_ingredient_error(
            database_error(DatabaseErrorKind::ForeignKeyViolation),
            None,
            Some(IngredientId::new(3)),
        );
        assert_eq!(err, IngredientRepositoryError::in_use(3_i64));
    }

    #[rstest]
    fn other_failures_are_query_errors() {
        let err = map_tag_error(DieselError::NotFound, None);
        assert!(matches!(err, TagRepositoryError::Query { .. }));
    }
}
