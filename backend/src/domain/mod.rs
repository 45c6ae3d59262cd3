//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define the strongly typed recipe-sharing model used by the HTTP
//! layer and the persistence adapters. Validation lives on the input types
//! (`*Draft`, `*Submission`, `Registration`) so that every constructed value
//! already satisfies its invariants.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: API error payload and stable identifiers.
//! - Catalogue entities: `Ingredient`, `Tag`.
//! - Recipes: `Recipe`, `RecipeDraft`, `RecipeFilter`, `ShortCode`.
//! - `ShoppingList`: aggregation of cart ingredients.
//! - Services implementing the driving ports in [`ports`].

pub mod auth;
pub mod error;
pub mod image;
pub mod ingredient;
pub mod ports;
pub mod recipe;
pub mod recipe_filter;
pub mod shopping_list;
pub mod short_code;
pub mod slug;
pub mod tag;
pub mod trace_id;
pub mod user;
pub mod validation;

pub(crate) mod port_errors;
mod serial_id;

mod account_service;
mod catalogue_service;
mod recipe_service;
mod relationship_service;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::account_service::AccountService;
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordChange, PasswordHash};
pub use self::catalogue_service::CatalogueService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::image::{
    ImageFormat, ImageKind, ImagePayload, ImageRef, ImageValidationError, MAX_IMAGE_BYTES,
};
pub use self::ingredient::{
    INGREDIENT_NAME_MAX, Ingredient, IngredientDraft, IngredientId, IngredientPatch,
    MEASUREMENT_UNIT_MAX,
};
pub use self::recipe::{
    ImageRequirement, IngredientAmount, IngredientAmountInput, MissingReferences, QUANTITY_MAX,
    QUANTITY_MIN, RECIPE_NAME_MAX, Recipe, RecipeDetails, RecipeDraft, RecipeId,
    RecipeIngredient, RecipeSubmission, RecipeSummary, Subscription,
};
pub use self::recipe_filter::{AuthorFilter, RecipeFilter, RecipeSearch, parse_flag};
pub use self::recipe_service::RecipeService;
pub use self::relationship_service::RelationshipService;
pub use self::shopping_list::{ShoppingList, ShoppingListEntry, ShoppingListLine};
pub use self::short_code::{SHORT_CODE_ATTEMPTS, SHORT_CODE_LEN, ShortCode, ShortCodeError};
pub use self::tag::{TAG_NAME_MAX, Tag, TagDraft, TagId, TagPatch};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, PersonName, Registration, RegistrationForm, User, UserId, UserProfile,
    UserValidationError, Username, check_password,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use recipes::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
