//! Port for ingredient catalogue persistence.

use async_trait::async_trait;

use crate::domain::{Ingredient, IngredientDraft, IngredientId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ingredient repository adapters.
    pub enum IngredientRepositoryError for "ingredient repository" {
        /// Another ingredient already has this name and unit.
        Duplicate { name: String, measurement_unit: String } =>
            "ingredient {name} ({measurement_unit}) already exists",
        /// The ingredient is still used by at least one recipe.
        InUse { id: i64 } => "ingredient {id} is used by recipes",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientRepository: Send + Sync {
    /// Insert a new ingredient.
    async fn create(&self, draft: &IngredientDraft)
    -> Result<Ingredient, IngredientRepositoryError>;

    /// Insert unless the `(name, unit)` pair exists; returns whether a row
    /// was written.
    async fn create_if_absent(
        &self,
        draft: &IngredientDraft,
    ) -> Result<bool, IngredientRepositoryError>;

    /// Overwrite an ingredient; `None` when it does not exist.
    async fn update(
        &self,
        id: IngredientId,
        draft: &IngredientDraft,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError>;

    /// Delete an ingredient; returns `false` when it does not exist.
    async fn delete(&self, id: IngredientId) -> Result<bool, IngredientRepositoryError>;

    async fn find(&self, id: IngredientId)
    -> Result<Option<Ingredient>, IngredientRepositoryError>;

    /// List ingredients ordered by name, optionally restricted to names
    /// starting with `name_prefix` (case-insensitive).
    async fn list(
        &self,
        name_prefix: Option<String>,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError>;
}
