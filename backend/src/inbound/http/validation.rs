//! Query-string and path parsing shared by the HTTP handlers.

use pagination::{LIMIT_PARAM, PAGE_PARAM, PageRequest, PaginationError};
use serde_json::json;

use crate::domain::validation::{FieldViolation, Violations};
use crate::domain::{AuthorFilter, Error, ImagePayload, RecipeFilter, UserId, parse_flag};

const TAGS_PARAM: &str = "tags";
const AUTHOR_PARAM: &str = "author";
const FAVORITED_PARAM: &str = "is_favorited";
const IN_CART_PARAM: &str = "is_in_shopping_cart";
pub(crate) const RECIPES_LIMIT_PARAM: &str = "recipes_limit";

/// Decoded query string that keeps repeated keys such as `tags`.
#[derive(Debug, Default)]
pub(crate) struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub(crate) fn parse(raw: &str) -> Self {
        Self(
            url::form_urlencoded::parse(raw.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        )
    }

    /// Last value given for `key`.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// `page` and `limit`, with defaults and bounds applied.
    pub(crate) fn page_request(&self) -> Result<PageRequest, Error> {
        PageRequest::from_params(self.get(PAGE_PARAM), self.get(LIMIT_PARAM))
            .map_err(pagination_error)
    }

    /// Recipe list filters. Flags are parsed strictly even when the
    /// viewer is anonymous and they end up ignored.
    pub(crate) fn recipe_filter(&self) -> Result<RecipeFilter, Error> {
        let tags = self
            .all(TAGS_PARAM)
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
            .map(str::to_owned)
            .collect();
        let author = self
            .get(AUTHOR_PARAM)
            .filter(|raw| !raw.trim().is_empty())
            .map(AuthorFilter::parse)
            .transpose()?;
        let flag = |name: &str| {
            self.get(name)
                .map_or(Ok(false), |raw| parse_flag(name, raw))
        };
        Ok(RecipeFilter {
            tags,
            author,
            is_favorited: flag(FAVORITED_PARAM)?,
            is_in_shopping_cart: flag(IN_CART_PARAM)?,
        })
    }

    /// Optional non-negative `recipes_limit`.
    pub(crate) fn recipes_limit(&self) -> Result<Option<usize>, Error> {
        self.get(RECIPES_LIMIT_PARAM)
            .map(|raw| {
                raw.trim().parse::<usize>().map_err(|_| {
                    Error::invalid_request("recipes_limit must be a non-negative integer")
                        .with_details(json!({ "field": RECIPES_LIMIT_PARAM, "value": raw }))
                })
            })
            .transpose()
    }
}

fn pagination_error(err: PaginationError) -> Error {
    let field = match err {
        PaginationError::InvalidPage { .. } => PAGE_PARAM,
        PaginationError::InvalidLimit { .. } | PaginationError::LimitTooLarge { .. } => {
            LIMIT_PARAM
        }
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// User ids in paths; a malformed id cannot name an existing user.
pub(crate) fn path_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found(format!("user {raw} not found")))
}

/// Decode an uploaded data URI, reporting problems against `field`.
pub(crate) fn image_payload(field: &'static str, raw: Option<&str>) -> Result<ImagePayload, Error> {
    let mut violations = Violations::new();
    let payload = match raw {
        None => {
            violations.push(FieldViolation::invalid(field, "required", format!("{field} is required")));
            None
        }
        Some(raw) => violations.check(
            ImagePayload::parse_data_uri(raw)
                .map_err(|err| FieldViolation::invalid(field, err.code(), err.to_string())),
        ),
    };
    violations.finish(|| payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn collects_repeated_and_comma_separated_tags() {
        let params = QueryParams::parse("tags=breakfast&tags=lunch,dinner&tags=");
        let filter = params.recipe_filter().expect("valid filter");
        let tags: Vec<_> = filter.tags.into_iter().collect();
        assert_eq!(tags, ["breakfast", "dinner", "lunch"]);
    }

    #[rstest]
    #[case("is_favorited=1&is_in_shopping_cart=false", true, false)]
    #[case("is_favorited=0&is_in_shopping_cart=true", false, true)]
    #[case("", false, false)]
    fn parses_flags(#[case] raw: &str, #[case] favorited: bool, #[case] in_cart: bool) {
        let filter = QueryParams::parse(raw).recipe_filter().expect("valid filter");
        assert_eq!(filter.is_favorited, favorited);
        assert_eq!(filter.is_in_shopping_cart, in_cart);
    }

    #[rstest]
    #[case("is_favorited=yes")]
    #[case("author=not-a-uuid")]
    fn rejects_malformed_filters(#[case] raw: &str) {
        let err = QueryParams::parse(raw)
            .recipe_filter()
            .expect_err("invalid filter");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn author_me_is_recognised() {
        let filter = QueryParams::parse("author=me")
            .recipe_filter()
            .expect("valid filter");
        assert_eq!(filter.author, Some(AuthorFilter::Me));
    }

    #[rstest]
    #[case("", 1, 6)]
    #[case("page=3&limit=10", 3, 10)]
    fn page_request_applies_defaults(#[case] raw: &str, #[case] page: u32, #[case] limit: u32) {
        let request = QueryParams::parse(raw).page_request().expect("valid page");
        assert_eq!((request.page(), request.limit()), (page, limit));
    }

    #[rstest]
    #[case("page=0", "page")]
    #[case("limit=abc", "limit")]
    #[case("limit=101", "limit")]
    fn page_request_errors_name_the_field(#[case] raw: &str, #[case] field: &str) {
        let err = QueryParams::parse(raw).page_request().expect_err("invalid page");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.details().and_then(|d| d["field"].as_str()), Some(field));
    }

    #[rstest]
    #[case("recipes_limit=3", Ok(Some(3)))]
    #[case("", Ok(None))]
    #[case("recipes_limit=-1", Err(()))]
    fn parses_recipes_limit(#[case] raw: &str, #[case] expected: Result<Option<usize>, ()>) {
        assert_eq!(QueryParams::parse(raw).recipes_limit().map_err(|_| ()), expected);
    }

    #[rstest]
    fn missing_image_reports_required_violation() {
        let err = image_payload("avatar", None).expect_err("missing image");
        let details = err.details().expect("details");
        assert_eq!(details["violations"][0]["field"], "avatar");
        assert_eq!(details["violations"][0]["code"], "required");
    }

    #[rstest]
    fn malformed_user_ids_are_not_found() {
        let err = path_user_id("42").expect_err("not a uuid");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
