//! Recipes, their submissions and the views handed to adapters.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::image::{ImagePayload, ImageRef};
use super::ingredient::bounded_text;
use super::serial_id::define_serial_id;
use super::validation::{FieldViolation, Violations};
use super::{Error, Ingredient, IngredientId, ShortCode, Tag, TagId, User, UserProfile};

define_serial_id! {
    /// Identifier of a [`Recipe`].
    pub struct RecipeId;
}

/// Maximum recipe name length.
pub const RECIPE_NAME_MAX: usize = 256;
/// Smallest accepted cooking time and ingredient amount.
pub const QUANTITY_MIN: i64 = 1;
/// Largest accepted cooking time and ingredient amount.
pub const QUANTITY_MAX: i64 = 32_000;

/// An ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: u16,
}

/// A stored recipe with its tags and ingredients.
///
/// ## Invariants
/// - `ingredients` and `tags` are non-empty and free of duplicates;
/// - `short_code` is unique and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: RecipeId,
    pub author: User,
    pub name: String,
    pub text: String,
    pub image: ImageRef,
    pub cooking_time: u16,
    pub short_code: ShortCode,
    pub created_at: DateTime<Utc>,
    /// Ordered by tag id.
    pub tags: Vec<Tag>,
    /// Ordered as submitted.
    pub ingredients: Vec<RecipeIngredient>,
}

/// Minimal recipe card used by favorites, cart and subscription listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub name: String,
    pub image: ImageRef,
    pub cooking_time: u16,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: recipe.image.clone(),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// A recipe decorated with flags relative to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetails {
    pub recipe: Recipe,
    pub author: UserProfile,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// A followed author with a preview of their recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub author: User,
    /// Newest first, truncated to the requested limit.
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: u64,
}

/// Raw ingredient line of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientAmountInput {
    pub id: Option<i64>,
    pub amount: Option<i64>,
}

/// Raw recipe payload as received from a client.
#[derive(Debug, Clone, Default)]
pub struct RecipeSubmission {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientAmountInput>>,
    pub tags: Option<Vec<i64>>,
}

/// Whether a submission must carry an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRequirement {
    /// Creation: the image is mandatory.
    Required,
    /// Update: an absent image keeps the stored one.
    Optional,
}

/// Validated ingredient line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient: IngredientId,
    pub amount: u16,
}

/// Ingredient and tag ids referenced by a draft that do not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingReferences {
    pub ingredients: Vec<IngredientId>,
    pub tags: Vec<TagId>,
}

impl MissingReferences {
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.tags.is_empty()
    }
}

/// Fully validated recipe submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: u16,
    pub image: Option<ImagePayload>,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<TagId>,
}

impl RecipeDraft {
    /// Validate `submission`, collecting every violation into one error.
    ///
    /// Repeated or empty ingredient and tag lists are reported as
    /// forbidden operations; everything else as invalid input.
    pub fn validate(
        submission: RecipeSubmission,
        image_requirement: ImageRequirement,
    ) -> Result<Self, Error> {
        let mut violations = Violations::new();
        let name = violations.check(bounded_text(submission.name, "name", RECIPE_NAME_MAX));
        let text = violations.check(bounded_text(submission.text, "text", usize::MAX));
        let cooking_time = violations.check(
            submission
                .cooking_time
                .ok_or_else(|| required("cookingTime"))
                .and_then(|value| quantity(value, "cookingTime")),
        );
        let image = violations.check(match (submission.image, image_requirement) {
            (None, ImageRequirement::Required) => Err(required("image")),
            (None, ImageRequirement::Optional) => Ok(None),
            (Some(raw), _) => ImagePayload::parse_data_uri(&raw)
                .map(Some)
                .map_err(|err| FieldViolation::invalid("image", err.code(), err.to_string())),
        });
        let ingredients = validate_ingredients(submission.ingredients, &mut violations);
        let tags = validate_tags(submission.tags, &mut violations);

        violations.finish(|| {
            Some(Self {
                name: name?,
                text: text?,
                cooking_time: cooking_time?,
                image: image?,
                ingredients: ingredients?,
                tags: tags?,
            })
        })
    }

    /// Ingredient ids in submission order.
    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        self.ingredients.iter().map(|line| line.ingredient).collect()
    }

    /// Build the error describing ids that do not exist, if any.
    pub fn reference_error(&self, missing: &MissingReferences) -> Option<Error> {
        if missing.is_empty() {
            return None;
        }
        let mut violations = Violations::new();
        for (index, line) in self.ingredients.iter().enumerate() {
            if missing.ingredients.contains(&line.ingredient) {
                violations.push(
                    FieldViolation::invalid(
                        "ingredients",
                        "unknown",
                        format!("ingredient {} does not exist", line.ingredient),
                    )
                    .at(index),
                );
            }
        }
        for (index, tag) in self.tags.iter().enumerate() {
            if missing.tags.contains(tag) {
                violations.push(
                    FieldViolation::invalid("tags", "unknown", format!("tag {tag} does not exist"))
                        .at(index),
                );
            }
        }
        Some(violations.into_error())
    }
}

fn required(field: &'static str) -> FieldViolation {
    FieldViolation::invalid(field, "required", format!("{field} is required"))
}

fn quantity(value: i64, field: &'static str) -> Result<u16, FieldViolation> {
    if !(QUANTITY_MIN..=QUANTITY_MAX).contains(&value) {
        return Err(FieldViolation::invalid(
            field,
            "out_of_range",
            format!("{field} must be between {QUANTITY_MIN} and {QUANTITY_MAX}"),
        ));
    }
    u16::try_from(value).map_err(|_| {
        FieldViolation::invalid(field, "out_of_range", format!("{field} is out of range"))
    })
}

fn positive_id(value: Option<i64>, field: &'static str) -> Result<i64, FieldViolation> {
    match value {
        Some(id) if id > 0 => Ok(id),
        Some(_) => Err(FieldViolation::invalid(
            field,
            "invalid",
            format!("{field} ids must be positive integers"),
        )),
        None => Err(FieldViolation::invalid(
            field,
            "required",
            format!("{field} entries require an id"),
        )),
    }
}

fn non_empty_list<T>(list: Option<Vec<T>>, field: &'static str) -> Result<Vec<T>, FieldViolation> {
    let list = list.ok_or_else(|| required(field))?;
    if list.is_empty() {
        return Err(FieldViolation::operation(
            field,
            "empty",
            format!("{field} must not be empty"),
        ));
    }
    Ok(list)
}

fn validate_ingredients(
    input: Option<Vec<IngredientAmountInput>>,
    violations: &mut Violations,
) -> Option<Vec<IngredientAmount>> {
    let lines = violations.check(non_empty_list(input, "ingredients"))?;
    let before = violations.as_slice().len();
    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(lines.len());
    for (index, line) in lines.into_iter().enumerate() {
        let id = violations.check(positive_id(line.id, "ingredients").map_err(|v| v.at(index)));
        let amount = violations.check(
            line.amount
                .ok_or_else(|| required("amount"))
                .and_then(|value| quantity(value, "amount"))
                .map_err(|v| v.at(index)),
        );
        if let Some(id) = id {
            if !seen.insert(id) {
                violations.push(
                    FieldViolation::operation(
                        "ingredients",
                        "duplicate",
                        format!("ingredient {id} is listed more than once"),
                    )
                    .at(index),
                );
            }
        }
        if let (Some(id), Some(amount)) = (id, amount) {
            validated.push(IngredientAmount {
                ingredient: IngredientId::new(id),
                amount,
            });
        }
    }
    (violations.as_slice().len() == before).then_some(validated)
}

fn validate_tags(input: Option<Vec<i64>>, violations: &mut Violations) -> Option<Vec<TagId>> {
    let ids = violations.check(non_empty_list(input, "tags"))?;
    let before = violations.as_slice().len();
    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(ids.len());
    for (index, id) in ids.into_iter().enumerate() {
        let Some(id) = violations.check(positive_id(Some(id), "tags").map_err(|v| v.at(index)))
        else {
            continue;
        };
        if seen.insert(id) {
            validated.push(TagId::new(id));
        } else {
            violations.push(
                FieldViolation::operation(
                    "tags",
                    "duplicate",
                    format!("tag {id} is listed more than once"),
                )
                .at(index),
            );
        }
    }
    (violations.as_slice().len() == before).then_some(validated)
}
