//! Recipe tags.

use super::Error;
use super::ingredient::bounded_text;
use super::serial_id::define_serial_id;
use super::slug::{SLUG_MAX, is_valid_slug};
use super::validation::{FieldViolation, Violations};

define_serial_id! {
    /// Identifier of a [`Tag`].
    pub struct TagId;
}

/// Maximum tag name length.
pub const TAG_NAME_MAX: usize = 32;

/// A tag recipes can be filtered by.
///
/// ## Invariants
/// - `slug` is unique and satisfies the slug character rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

/// Validated tag fields ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    name: String,
    slug: String,
}

impl TagDraft {
    /// Validate the raw fields, reporting every violation.
    pub fn validate(name: Option<String>, slug: Option<String>) -> Result<Self, Error> {
        let mut violations = Violations::new();
        let name = violations.check(bounded_text(name, "name", TAG_NAME_MAX));
        let slug = violations.check(
            bounded_text(slug, "slug", SLUG_MAX).and_then(|slug| {
                if is_valid_slug(&slug) {
                    Ok(slug)
                } else {
                    Err(FieldViolation::invalid(
                        "slug",
                        "invalid",
                        "slug may only contain lowercase letters, digits, hyphens and underscores",
                    ))
                }
            }),
        );
        violations.finish(|| {
            Some(Self {
                name: name?,
                slug: slug?,
            })
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }
}

/// Partial tag update; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl TagPatch {
    /// Merge onto `current` and validate the result.
    pub fn apply(self, current: &Tag) -> Result<TagDraft, Error> {
        TagDraft::validate(
            Some(self.name.unwrap_or_else(|| current.name.clone())),
            Some(self.slug.unwrap_or_else(|| current.slug.clone())),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Breakfast", "breakfast", true)]
    #[case("Low carb", "low_carb-2", true)]
    #[case("Vegan", "Vegan", false)]
    #[case("Vegan", "ve gan", false)]
    #[case("", "vegan", false)]
    fn validates_name_and_slug(#[case] name: &str, #[case] slug: &str, #[case] ok: bool) {
        let result = TagDraft::validate(Some(name.to_owned()), Some(slug.to_owned()));
        assert_eq!(result.is_ok(), ok, "{result:?}");
    }

    #[rstest]
    fn patch_replaces_slug_only() {
        let current = Tag {
            id: TagId::new(1),
            name: "Lunch".into(),
            slug: "lunch".into(),
        };
        let draft = TagPatch {
            slug: Some("midday".into()),
            ..TagPatch::default()
        }
        .apply(&current)
        .expect("valid patch");
        assert_eq!(draft.name(), "Lunch");
        assert_eq!(draft.slug(), "midday");
    }
}
