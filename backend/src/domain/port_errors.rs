//! Translation of driven-port errors into domain errors.
//!
//! Connection failures surface as `service_unavailable`, query failures as
//! `internal_error`. Port-specific variants map to the domain code that
//! describes them to clients.

use tracing::warn;

use super::Error;
use super::ports::{
    FollowRepositoryError, ImageStoreError, IngredientRepositoryError, MembershipRepositoryError,
    PasswordHasherError, RecipeRepositoryError, TagRepositoryError, UserPersistenceError,
};

pub(crate) fn user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::conflict(format!("a user with this {field} already exists"))
        }
    }
}

pub(crate) fn ingredient_error(error: IngredientRepositoryError) -> Error {
    match error {
        IngredientRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ingredient repository unavailable: {message}"))
        }
        IngredientRepositoryError::Query { message } => {
            Error::internal(format!("ingredient repository error: {message}"))
        }
        err @ (IngredientRepositoryError::Duplicate { .. }
        | IngredientRepositoryError::InUse { .. }) => Error::conflict(err.to_string()),
    }
}

pub(crate) fn tag_error(error: TagRepositoryError) -> Error {
    match error {
        TagRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("tag repository unavailable: {message}"))
        }
        TagRepositoryError::Query { message } => {
            Error::internal(format!("tag repository error: {message}"))
        }
        err @ TagRepositoryError::DuplicateSlug { .. } => Error::conflict(err.to_string()),
    }
}

pub(crate) fn recipe_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
        RecipeRepositoryError::ShortCodeTaken { code } => {
            Error::internal(format!("short code {code} collided"))
        }
        RecipeRepositoryError::MissingReference { message } => Error::not_found(message),
    }
}

pub(crate) fn membership_error(error: MembershipRepositoryError) -> Error {
    match error {
        MembershipRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("membership repository unavailable: {message}"))
        }
        MembershipRepositoryError::Query { message } => {
            Error::internal(format!("membership repository error: {message}"))
        }
        MembershipRepositoryError::MissingReference { message } => Error::not_found(message),
    }
}

pub(crate) fn follow_error(error: FollowRepositoryError) -> Error {
    match error {
        FollowRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("follow repository unavailable: {message}"))
        }
        FollowRepositoryError::Query { message } => {
            Error::internal(format!("follow repository error: {message}"))
        }
        FollowRepositoryError::MissingReference { message } => Error::not_found(message),
    }
}

pub(crate) fn image_error(error: ImageStoreError) -> Error {
    Error::internal(format!("image store error: {error}"))
}

pub(crate) fn hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Log and drop a failure to delete a replaced image file.
pub(crate) fn log_discarded_image(result: Result<(), ImageStoreError>) {
    if let Err(error) = result {
        warn!(%error, "failed to delete replaced image");
    }
}
