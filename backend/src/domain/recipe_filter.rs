//! Recipe list filters.
//!
//! [`RecipeFilter`] mirrors what a client asked for. Resolving it against
//! the viewer yields a [`RecipeSearch`] that repositories can run without
//! knowing anything about sessions.

use std::collections::BTreeSet;

use super::{Error, UserId};

/// Literal accepted in place of a user id to mean "the viewer".
pub const AUTHOR_ME: &str = "me";

/// Author restriction requested by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorFilter {
    /// Recipes written by the viewer.
    Me,
    /// Recipes written by the given user.
    User(UserId),
}

impl AuthorFilter {
    /// Parse `me` or a user id.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let raw = raw.trim();
        if raw == AUTHOR_ME {
            return Ok(Self::Me);
        }
        UserId::new(raw)
            .map(Self::User)
            .map_err(|err| Error::invalid_request(format!("author: {err}")))
    }
}

/// Parse the boolean flags accepted by list filters: `1|0|true|false`.
pub fn parse_flag(field: &str, raw: &str) -> Result<bool, Error> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(Error::invalid_request(format!(
            "{field} must be one of 1, 0, true or false"
        ))),
    }
}

/// Client-supplied recipe list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Tag slugs; a recipe matches when it carries any of them.
    pub tags: BTreeSet<String>,
    pub author: Option<AuthorFilter>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// A filter bound to a concrete viewer, ready for a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeSearch {
    pub tags: Vec<String>,
    pub author: Option<UserId>,
    pub favorited_by: Option<UserId>,
    pub in_cart_of: Option<UserId>,
}

impl RecipeFilter {
    /// Bind the filter to `viewer`.
    ///
    /// Favorite and cart restrictions are dropped for anonymous viewers.
    /// Returns `None` when the filter cannot match anything, which happens
    /// when an anonymous viewer asks for their own recipes.
    ///
    /// # Examples
    /// ```
    /// use recipes::domain::{AuthorFilter, RecipeFilter};
    ///
    /// let filter = RecipeFilter {
    ///     author: Some(AuthorFilter::Me),
    ///     ..RecipeFilter::default()
    /// };
    /// assert!(filter.resolve(None).is_none());
    /// ```
    pub fn resolve(&self, viewer: Option<&UserId>) -> Option<RecipeSearch> {
        let author = match (&self.author, viewer) {
            (None, _) => None,
            (Some(AuthorFilter::User(id)), _) => Some(id.clone()),
            (Some(AuthorFilter::Me), Some(viewer)) => Some(viewer.clone()),
            (Some(AuthorFilter::Me), None) => return None,
        };
        let for_viewer = |enabled: bool| viewer.filter(|_| enabled).cloned();
        Some(RecipeSearch {
            tags: self.tags.iter().cloned().collect(),
            author,
            favorited_by: for_viewer(self.is_favorited),
            in_cart_of: for_viewer(self.is_in_shopping_cart),
        })
    }
}
