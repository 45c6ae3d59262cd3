//! Shopping list aggregation.
//!
//! The list is built from every recipe ingredient row of the recipes in a
//! user's cart. Rows are merged by ingredient name and measurement unit, so
//! two catalogue entries spelled the same way collapse into one line.

use std::collections::HashMap;
use std::fmt;

/// One recipe ingredient row from a recipe in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub amount: u16,
}

impl ShoppingListEntry {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, amount: u16) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            amount,
        }
    }
}

/// A merged shopping list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub total: u64,
}

/// Aggregated shopping list.
///
/// ## Invariants
/// - at most one line per `(name, measurement_unit)` pair;
/// - lines keep the order in which their pair was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    lines: Vec<ShoppingListLine>,
}

impl ShoppingList {
    /// Merge ordered rows into a list.
    ///
    /// # Examples
    /// ```
    /// use recipes::domain::{ShoppingList, ShoppingListEntry};
    ///
    /// let list = ShoppingList::aggregate([
    ///     ShoppingListEntry::new("Flour", "g", 200),
    ///     ShoppingListEntry::new("Flour", "g", 300),
    /// ]);
    /// assert_eq!(list.render(), "Flour (g) - 500\n");
    /// ```
    pub fn aggregate(entries: impl IntoIterator<Item = ShoppingListEntry>) -> Self {
        let mut positions: HashMap<(String, String), usize> = HashMap::new();
        let mut lines: Vec<ShoppingListLine> = Vec::new();
        for entry in entries {
            let key = (entry.name, entry.measurement_unit);
            match positions.get(&key) {
                Some(&position) => lines[position].total += u64::from(entry.amount),
                None => {
                    positions.insert(key.clone(), lines.len());
                    let (name, measurement_unit) = key;
                    lines.push(ShoppingListLine {
                        name,
                        measurement_unit,
                        total: u64::from(entry.amount),
                    });
                }
            }
        }
        Self { lines }
    }

    /// Merged lines in the order their ingredients first appeared.
    pub fn lines(&self) -> &[ShoppingListLine] {
        &self.lines
    }

    /// True when the cart held nothing to buy.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Plain-text rendering, one `"{name} ({unit}) - {total}\n"` line per
    /// group. An empty list renders as the empty string.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{} ({}) - {}", line.name, line.measurement_unit, line.total)?;
        }
        Ok(())
    }
}
