//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, image store, hashing, short codes) are
//! implemented by outbound adapters. Driving ports (commands and queries)
//! are implemented by the domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account;
mod catalogue;
mod follow_repository;
mod image_store;
mod ingredient_repository;
mod login_service;
mod membership_repository;
mod password_hasher;
mod recipe_command;
mod recipe_query;
mod recipe_repository;
mod relationship_command;
mod short_code_source;
mod tag_repository;
mod user_repository;

#[cfg(test)]
pub use account::{MockAccountCommand, MockAccountQuery};
pub use account::{AccountCommand, AccountQuery};
#[cfg(test)]
pub use catalogue::{MockCatalogueCommand, MockCatalogueQuery};
pub use catalogue::{CatalogueCommand, CatalogueQuery};
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
pub use follow_repository::{FollowRepository, FollowRepositoryError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use ingredient_repository::MockIngredientRepository;
pub use ingredient_repository::{IngredientRepository, IngredientRepositoryError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use membership_repository::MockMembershipRepository;
pub use membership_repository::{MembershipRepository, MembershipRepositoryError, RecipeList};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use recipe_command::MockRecipeCommand;
pub use recipe_command::RecipeCommand;
#[cfg(test)]
pub use recipe_query::MockRecipeQuery;
pub use recipe_query::RecipeQuery;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{
    AuthorRecipes, NewRecipe, RecipeChanges, RecipeRepository, RecipeRepositoryError,
};
#[cfg(test)]
pub use relationship_command::{MockRelationshipCommand, MockRelationshipQuery};
pub use relationship_command::{RelationshipCommand, RelationshipQuery};
#[cfg(test)]
pub use short_code_source::MockShortCodeSource;
pub use short_code_source::{RandomShortCodes, SeededShortCodes, ShortCodeSource};
#[cfg(test)]
pub use tag_repository::MockTagRepository;
pub use tag_repository::{TagRepository, TagRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
