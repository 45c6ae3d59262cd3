//! Ingredient catalogue entries.

use super::Error;
use super::serial_id::define_serial_id;
use super::validation::{FieldViolation, Violations};

define_serial_id! {
    /// Identifier of an [`Ingredient`].
    pub struct IngredientId;
}

/// Maximum ingredient name length.
pub const INGREDIENT_NAME_MAX: usize = 128;
/// Maximum measurement unit length.
pub const MEASUREMENT_UNIT_MAX: usize = 64;

/// A catalogue ingredient with its measurement unit.
///
/// ## Invariants
/// - `(name, measurement_unit)` is unique across the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

/// Validated ingredient fields ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientDraft {
    name: String,
    measurement_unit: String,
}

impl IngredientDraft {
    /// Validate the raw fields, reporting every violation.
    ///
    /// # Examples
    /// ```
    /// use recipes::domain::IngredientDraft;
    ///
    /// let draft = IngredientDraft::validate(Some(" Flour ".into()), Some("g".into()))
    ///     .expect("valid ingredient");
    /// assert_eq!(draft.name(), "Flour");
    /// ```
    pub fn validate(name: Option<String>, measurement_unit: Option<String>) -> Result<Self, Error> {
        let mut violations = Violations::new();
        let name = violations.check(bounded_text(name, "name", INGREDIENT_NAME_MAX));
        let measurement_unit = violations.check(bounded_text(
            measurement_unit,
            "measurementUnit",
            MEASUREMENT_UNIT_MAX,
        ));
        violations.finish(|| {
            Some(Self {
                name: name?,
                measurement_unit: measurement_unit?,
            })
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }
}

/// Partial ingredient update; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub measurement_unit: Option<String>,
}

impl IngredientPatch {
    /// Merge onto `current` and validate the result.
    pub fn apply(self, current: &Ingredient) -> Result<IngredientDraft, Error> {
        IngredientDraft::validate(
            Some(self.name.unwrap_or_else(|| current.name.clone())),
            Some(
                self.measurement_unit
                    .unwrap_or_else(|| current.measurement_unit.clone()),
            ),
        )
    }
}

/// Trim `value` and check it is present, non-blank and at most `max`
/// characters long.
pub(crate) fn bounded_text(
    value: Option<String>,
    field: &'static str,
    max: usize,
) -> Result<String, FieldViolation> {
    let value = value
        .ok_or_else(|| FieldViolation::invalid(field, "required", format!("{field} is required")))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldViolation::invalid(
            field,
            "blank",
            format!("{field} must not be blank"),
        ));
    }
    if trimmed.chars().count() > max {
        return Err(FieldViolation::invalid(
            field,
            "too_long",
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}
