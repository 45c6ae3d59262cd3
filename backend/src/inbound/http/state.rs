//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle through `web::Data` and only ever talk to
//! driving ports, so they can be exercised with mocks or the in-memory
//! adapters without any I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, CatalogueCommand, CatalogueQuery, LoginService, RecipeCommand,
    RecipeQuery, RelationshipCommand, RelationshipQuery,
};

/// Driving ports used by the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub account_query: Arc<dyn AccountQuery>,
    pub catalogue: Arc<dyn CatalogueCommand>,
    pub catalogue_query: Arc<dyn CatalogueQuery>,
    pub recipes: Arc<dyn RecipeCommand>,
    pub recipe_query: Arc<dyn RecipeQuery>,
    pub relationships: Arc<dyn RelationshipCommand>,
    pub relationship_query: Arc<dyn RelationshipQuery>,
}
