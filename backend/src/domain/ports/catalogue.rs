//! Driving ports for the ingredient and tag catalogue.
//!
//! Reads are public; writes require a staff account.

use async_trait::async_trait;

use crate::domain::{
    Error, Ingredient, IngredientId, IngredientPatch, Tag, TagId, TagPatch, UserId,
};

/// Domain use-case port for catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// Ingredients ordered by name, optionally filtered by a
    /// case-insensitive name prefix.
    async fn ingredients(&self, name_prefix: Option<String>) -> Result<Vec<Ingredient>, Error>;

    async fn ingredient(&self, id: IngredientId) -> Result<Ingredient, Error>;

    async fn tags(&self) -> Result<Vec<Tag>, Error>;

    async fn tag(&self, id: TagId) -> Result<Tag, Error>;
}

/// Domain use-case port for catalogue writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    async fn create_ingredient(
        &self,
        actor: &UserId,
        name: Option<String>,
        measurement_unit: Option<String>,
    ) -> Result<Ingredient, Error>;

    async fn update_ingredient(
        &self,
        actor: &UserId,
        id: IngredientId,
        patch: IngredientPatch,
    ) -> Result<Ingredient, Error>;

    /// Fails with a conflict while recipes still use the ingredient.
    async fn delete_ingredient(&self, actor: &UserId, id: IngredientId) -> Result<(), Error>;

    async fn create_tag(
        &self,
        actor: &UserId,
        name: Option<String>,
        slug: Option<String>,
    ) -> Result<Tag, Error>;

    async fn update_tag(&self, actor: &UserId, id: TagId, patch: TagPatch) -> Result<Tag, Error>;

    async fn delete_tag(&self, actor: &UserId, id: TagId) -> Result<(), Error>;
}
